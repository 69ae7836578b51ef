use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, comments, listings, locations, profile};

/// REST surface. Handlers behind `require_auth` read the caller from the
/// request's `Claims` extension.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/users/{user_id}", get(profile::get_user))
        .route("/listings", get(listings::browse))
        .route("/listings/existing", post(listings::existing))
        .route("/listings/{listing_id}", get(listings::detail))
        .route("/listings/{listing_id}/comments", get(comments::list))
        .route("/locations", get(locations::list))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/profile", put(profile::update_profile))
        .route("/listings", post(listings::create))
        .route(
            "/listings/{listing_id}",
            put(listings::update).delete(listings::delete),
        )
        .route("/my/listings", get(listings::mine))
        .route("/my/listings/{listing_id}", get(listings::mine_one))
        .route("/listings/{listing_id}/comments", post(comments::create))
        .route(
            "/comments/{comment_id}",
            put(comments::update).delete(comments::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> &'static str {
    "ok"
}
