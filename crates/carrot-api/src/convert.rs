//! Storage rows to API models. Ids and timestamps are stored as text; rows
//! that fail to parse are logged and skipped by list callers.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use carrot_db::models::{CommentRow, ListingRow, UserRow};
use carrot_types::models::{Comment, Listing, TradeType, User};

pub fn now_string(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn parse_uuid(value: &str) -> Result<Uuid> {
    value.parse().with_context(|| format!("invalid uuid {:?}", value))
}

pub fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid timestamp {:?}", value))?;
    Ok(parsed.with_timezone(&Utc))
}

pub fn user(row: UserRow) -> Result<User> {
    Ok(User {
        id: parse_uuid(&row.id)?,
        email: row.email,
        nickname: row.nickname,
        location: row.location,
        avatar_url: row.avatar_url,
        rating: row.rating,
        trade_count: row.trade_count,
        created_at: parse_time(&row.created_at)?,
    })
}

pub fn listing(row: ListingRow) -> Result<Listing> {
    let trade_type = TradeType::parse(&row.trade_type)
        .with_context(|| format!("unknown trade type {:?}", row.trade_type))?;
    Ok(Listing {
        id: parse_uuid(&row.id)?,
        title: row.title,
        description: row.description,
        price: row.price,
        trade_type,
        image: row.image,
        user_id: parse_uuid(&row.user_id)?,
        created_at: parse_time(&row.created_at)?,
    })
}

pub fn comment(row: CommentRow) -> Result<Comment> {
    Ok(Comment {
        id: parse_uuid(&row.id)?,
        product_id: parse_uuid(&row.product_id)?,
        user_id: parse_uuid(&row.user_id)?,
        content: row.content,
        created_at: parse_time(&row.created_at)?,
        updated_at: parse_time(&row.updated_at)?,
    })
}

/// Converts every row, dropping the ones that do not parse.
pub fn all<R, T>(rows: Vec<R>, convert: fn(R) -> Result<T>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match convert(row) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping malformed row: {:#}", e);
                None
            }
        })
        .collect()
}
