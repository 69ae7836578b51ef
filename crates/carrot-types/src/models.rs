use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered member. The password hash never leaves the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub nickname: String,
    pub location: String,
    pub avatar_url: Option<String>,
    pub rating: f64,
    pub trade_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    #[default]
    Sell,
    /// Free giveaway, always priced at 0.
    Share,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sell => "sell",
            Self::Share => "share",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sell" => Some(Self::Sell),
            "share" => Some(Self::Share),
            _ => None,
        }
    }
}

/// A row of the `market` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub trade_type: TradeType,
    pub image: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_share(&self) -> bool {
        self.trade_type == TradeType::Share
    }

    /// Price shown to buyers; giveaways always show 0.
    pub fn display_price(&self) -> i64 {
        if self.is_share() { 0 } else { self.price }
    }
}

impl AsRef<Listing> for Listing {
    fn as_ref(&self) -> &Listing {
        self
    }
}

/// Seller details attached to a listing for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: Option<Uuid>,
    pub nickname: String,
    pub avatar_url: Option<String>,
    pub location: String,
    pub rating: f64,
    pub trade_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingWithSeller {
    #[serde(flatten)]
    pub listing: Listing,
    pub seller: Seller,
}

impl AsRef<Listing> for ListingWithSeller {
    fn as_ref(&self) -> &Listing {
        &self.listing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: Uuid,
    pub nickname: String,
    pub avatar_url: Option<String>,
}

/// A comment merged in memory with its author's public profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: CommentAuthor,
}
