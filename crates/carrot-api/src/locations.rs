use axum::{Json, extract::Query};

use carrot_core::locations;
use carrot_types::api::{LocationGroups, LocationQuery};

/// Town table for the location picker, grouped into Seoul and Gyeonggi.
pub async fn list(Query(query): Query<LocationQuery>) -> Json<LocationGroups> {
    Json(locations::grouped(query.q.as_deref().unwrap_or_default()))
}
