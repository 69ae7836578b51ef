//! Database row types. These map directly to SQLite rows and stay
//! independent of the carrot-types API models.

#[derive(Debug)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub nickname: String,
    pub location: String,
    pub avatar_url: Option<String>,
    pub rating: f64,
    pub trade_count: i64,
    pub created_at: String,
}

/// Column values for a new user; rating and trade count take their defaults.
pub struct NewUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub nickname: &'a str,
    pub location: &'a str,
    pub created_at: &'a str,
}

pub struct ListingRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub trade_type: String,
    pub image: String,
    pub user_id: String,
    pub created_at: String,
}

/// Editable listing columns, shared by insert and update.
pub struct ListingFields<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price: i64,
    pub trade_type: &'a str,
    pub image: &'a str,
}

pub struct CommentRow {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}
