use std::sync::Arc;

use tracing::error;

use carrot_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Lifetime of an issued login token.
    pub session_ttl: chrono::Duration,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: impl Into<String>, session_hours: i64) -> AppState {
        Arc::new(Self {
            db,
            jwt_secret: jwt_secret.into(),
            session_ttl: chrono::Duration::hours(session_hours),
        })
    }
}

/// Runs a blocking database closure off the async runtime.
pub async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })?
        .map_err(ApiError::from)
}
