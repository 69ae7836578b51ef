use crate::Database;
use crate::models::{CommentRow, ListingFields, ListingRow, NewUser, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row, ToSql};

const USER_COLUMNS: &str =
    "id, email, password_hash, nickname, location, avatar_url, rating, trade_count, created_at";
const LISTING_COLUMNS: &str = "id, title, description, price, trade_type, image, user_id, created_at";
const COMMENT_COLUMNS: &str = "id, product_id, user_id, content, created_at, updated_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &NewUser<'_>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password_hash, nickname, location, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (
                    user.id,
                    user.email,
                    user.password_hash,
                    user.nickname,
                    user.location,
                    user.created_at,
                ),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT id FROM users WHERE email = ?1", [email], |row| {
                    row.get::<_, String>(0)
                })
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// True if another user (other than `except_id`) already uses the nickname.
    pub fn nickname_taken(&self, nickname: &str, except_id: Option<&str>) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<String> = conn
                .query_row("SELECT id FROM users WHERE nickname = ?1", [nickname], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(match (found, except_id) {
                (Some(id), Some(except)) => id != except,
                (Some(_), None) => true,
                (None, _) => false,
            })
        })
    }

    /// Batch-fetch users for a set of ids. Unknown ids are simply absent.
    pub fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<UserRow>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users WHERE id IN ({})",
                USER_COLUMNS,
                placeholders(ids.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(as_params(ids).as_slice(), map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Updates the editable profile columns. Returns the fresh row, or `None`
    /// if the user does not exist.
    pub fn update_profile(
        &self,
        id: &str,
        nickname: &str,
        location: &str,
        avatar_url: Option<&str>,
    ) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET nickname = ?1, location = ?2, avatar_url = ?3 WHERE id = ?4",
                rusqlite::params![nickname, location, avatar_url, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_user(conn, "id", id)
        })
    }

    // -- Listings --

    pub fn insert_listing(
        &self,
        id: &str,
        user_id: &str,
        fields: &ListingFields<'_>,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO market (id, title, description, price, trade_type, image, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    id,
                    fields.title,
                    fields.description,
                    fields.price,
                    fields.trade_type,
                    fields.image,
                    user_id,
                    created_at,
                ],
            )?;
            Ok(())
        })
    }

    /// All listings, newest first.
    pub fn list_listings(&self) -> Result<Vec<ListingRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM market ORDER BY created_at DESC", LISTING_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_listing)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_listings_by_user(&self, user_id: &str) -> Result<Vec<ListingRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM market WHERE user_id = ?1 ORDER BY created_at DESC",
                LISTING_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], map_listing)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_listings_by_user(&self, user_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM market WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn get_listing(&self, id: &str) -> Result<Option<ListingRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM market WHERE id = ?1", LISTING_COLUMNS);
            let row = conn.query_row(&sql, [id], map_listing).optional()?;
            Ok(row)
        })
    }

    /// Fetch a listing only if `user_id` owns it.
    pub fn get_owned_listing(&self, id: &str, user_id: &str) -> Result<Option<ListingRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM market WHERE id = ?1 AND user_id = ?2", LISTING_COLUMNS);
            let row = conn.query_row(&sql, [id, user_id], map_listing).optional()?;
            Ok(row)
        })
    }

    /// Owner-scoped update. Returns `None` when the listing does not exist or
    /// belongs to someone else.
    pub fn update_listing(
        &self,
        id: &str,
        user_id: &str,
        fields: &ListingFields<'_>,
    ) -> Result<Option<ListingRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE market SET title = ?1, description = ?2, price = ?3, trade_type = ?4, image = ?5
                 WHERE id = ?6 AND user_id = ?7",
                rusqlite::params![
                    fields.title,
                    fields.description,
                    fields.price,
                    fields.trade_type,
                    fields.image,
                    id,
                    user_id,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let sql = format!("SELECT {} FROM market WHERE id = ?1", LISTING_COLUMNS);
            let row = conn.query_row(&sql, [id], map_listing).optional()?;
            Ok(row)
        })
    }

    /// Owner-scoped delete. Returns whether a row was removed.
    pub fn delete_listing(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM market WHERE id = ?1 AND user_id = ?2",
                [id, user_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Returns the subset of `ids` that still exist, in storage order.
    pub fn existing_listing_ids(&self, ids: &[String]) -> Result<Vec<String>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let sql = format!("SELECT id FROM market WHERE id IN ({})", placeholders(ids.len()));
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(as_params(ids).as_slice(), |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Comments --

    pub fn insert_comment(
        &self,
        id: &str,
        product_id: &str,
        user_id: &str,
        content: &str,
        now: &str,
    ) -> Result<CommentRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, product_id, user_id, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                [id, product_id, user_id, content, now],
            )?;
            Ok(CommentRow {
                id: id.to_string(),
                product_id: product_id.to_string(),
                user_id: user_id.to_string(),
                content: content.to_string(),
                created_at: now.to_string(),
                updated_at: now.to_string(),
            })
        })
    }

    /// Comments on a listing, oldest first.
    pub fn get_comments_for_listing(&self, product_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM comments WHERE product_id = ?1 ORDER BY created_at ASC",
                COMMENT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([product_id], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Author-scoped edit. Returns `None` if the comment is missing or not
    /// written by `user_id`.
    pub fn update_comment(
        &self,
        id: &str,
        user_id: &str,
        content: &str,
        updated_at: &str,
    ) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE comments SET content = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
                [content, updated_at, id, user_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let sql = format!("SELECT {} FROM comments WHERE id = ?1", COMMENT_COLUMNS);
            let row = conn.query_row(&sql, [id], map_comment).optional()?;
            Ok(row)
        })
    }

    /// Author-scoped delete. Returns whether a row was removed.
    pub fn delete_comment(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM comments WHERE id = ?1 AND user_id = ?2",
                [id, user_id],
            )?;
            Ok(changed > 0)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);
    let row = conn.query_row(&sql, [value], map_user).optional()?;
    Ok(row)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        nickname: row.get(3)?,
        location: row.get(4)?,
        avatar_url: row.get(5)?,
        rating: row.get(6)?,
        trade_count: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn map_listing(row: &Row<'_>) -> rusqlite::Result<ListingRow> {
    Ok(ListingRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        trade_type: row.get(4)?,
        image: row.get(5)?,
        user_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        product_id: row.get(1)?,
        user_id: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn placeholders(n: usize) -> String {
    (1..=n).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ")
}

fn as_params(values: &[String]) -> Vec<&dyn ToSql> {
    values.iter().map(|v| v as &dyn ToSql).collect()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Unique user column a failed write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakenField {
    Email,
    Nickname,
}

/// Maps a UNIQUE constraint failure on `users` to the column involved.
/// Anything else yields `None`.
pub fn taken_field(err: &anyhow::Error) -> Option<TakenField> {
    match err.downcast_ref::<rusqlite::Error>()? {
        rusqlite::Error::SqliteFailure(e, Some(msg)) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            if msg.contains("users.email") {
                Some(TakenField::Email)
            } else if msg.contains("users.nickname") {
                Some(TakenField::Nickname)
            } else {
                None
            }
        }
        _ => None,
    }
}
