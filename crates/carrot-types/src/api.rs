use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ListingWithSeller, TradeType, User};

// -- JWT Claims --

/// JWT claims shared by the REST middleware and the client session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub nickname: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub nickname: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

// -- Profile --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub nickname: String,
    pub location: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

// -- Listings --

/// Sell / edit form payload. `images` holds image references (URLs or
/// data URIs); only the first one is stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListingForm {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub trade_type: TradeType,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Query string for `GET /listings`. Values are parsed leniently: an unknown
/// filter or sort falls back to the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub filter: Option<String>,
    pub sort: Option<String>,
    /// Comma-separated favorite ids, used with `filter=favorites`.
    pub ids: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyListingsResponse {
    pub count: usize,
    pub listings: Vec<ListingWithSeller>,
}

/// Most ids one existence check may carry.
pub const MAX_EXISTENCE_IDS: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExistingListingsRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingListingsResponse {
    pub ids: Vec<String>,
}

// -- Comments --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentRequest {
    pub content: String,
}

// -- Locations --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaEntry {
    pub area: String,
    pub neighborhoods: Vec<String>,
}

/// Picker table split into Seoul districts and Gyeonggi cities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationGroups {
    pub seoul: Vec<AreaEntry>,
    pub gyeonggi: Vec<AreaEntry>,
}

// -- Errors --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
