use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use carrot_core::display;
use carrot_core::messages;
use carrot_core::validation::validate_comment;
use carrot_db::Database;
use carrot_db::models::{CommentRow, UserRow};
use carrot_types::api::{Claims, CommentRequest};
use carrot_types::models::{Comment, CommentWithAuthor, User};

use crate::convert;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::{AppState, with_db};

/// Comments on a listing, oldest first, each merged with its author.
pub async fn list(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> Result<Json<Vec<CommentWithAuthor>>, ApiError> {
    let comments = with_db(&state, move |db| {
        let rows = db.get_comments_for_listing(&listing_id)?;
        Ok(with_authors(db, rows))
    })
    .await?;
    Ok(Json(comments))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<String>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = validate_comment(&req.content)?;
    let id = Uuid::new_v4().to_string();
    let author = claims.sub.to_string();
    let now = convert::now_string(Utc::now());

    let created = with_db(&state, move |db| {
        if db.get_listing(&listing_id)?.is_none() {
            return Ok(None);
        }
        let row = db.insert_comment(&id, &listing_id, &author, &content, &now)?;
        let user = db.get_user_by_id(&author)?;
        Ok(Some((row, user)))
    })
    .await?
    .ok_or(ApiError::NotFound(messages::COMMENT_LISTING_MISSING))?;

    let (row, user) = created;
    let comment = attach_author(row, user)?;
    info!("Comment {} added to listing {}", comment.comment.id, comment.comment.product_id);
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<String>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<Json<CommentWithAuthor>, ApiError> {
    let content = validate_comment(&req.content)?;
    let author = claims.sub.to_string();
    let now = convert::now_string(Utc::now());

    let (row, user) = with_db(&state, move |db| {
        let Some(row) = db.update_comment(&comment_id, &author, &content, &now)? else {
            return Ok(None);
        };
        let user = db.get_user_by_id(&author)?;
        Ok(Some((row, user)))
    })
    .await?
    .ok_or(ApiError::NotFound(messages::COMMENT_NOT_FOUND))?;

    Ok(Json(attach_author(row, user)?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let author = claims.sub.to_string();
    let removed = with_db(&state, move |db| db.delete_comment(&comment_id, &author)).await?;
    if !removed {
        return Err(ApiError::NotFound(messages::COMMENT_NOT_FOUND));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn attach_author(row: CommentRow, user: Option<UserRow>) -> anyhow::Result<CommentWithAuthor> {
    let comment = convert::comment(row)?;
    let user = user.map(convert::user).transpose()?;
    let author = display::comment_author(user.as_ref(), comment.user_id);
    Ok(CommentWithAuthor { comment, author })
}

/// Batch-loads authors for a page of comments. Unknown authors keep their
/// id with the fallback nickname.
fn with_authors(db: &Database, rows: Vec<CommentRow>) -> Vec<CommentWithAuthor> {
    let comments: Vec<Comment> = convert::all(rows, convert::comment);

    let mut author_ids: Vec<String> = comments.iter().map(|c| c.user_id.to_string()).collect();
    author_ids.sort();
    author_ids.dedup();

    let authors: HashMap<Uuid, User> = match db.get_users_by_ids(&author_ids) {
        Ok(rows) => convert::all(rows, convert::user)
            .into_iter()
            .map(|user| (user.id, user))
            .collect(),
        Err(e) => {
            warn!("Author lookup failed: {:#}", e);
            HashMap::new()
        }
    };

    comments
        .into_iter()
        .map(|comment| {
            let author = display::comment_author(authors.get(&comment.user_id), comment.user_id);
            CommentWithAuthor { comment, author }
        })
        .collect()
}
