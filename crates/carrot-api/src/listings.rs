use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use carrot_core::catalog::{self, CatalogQuery};
use carrot_core::display;
use carrot_core::messages;
use carrot_core::validation::{ValidListing, validate_listing};
use carrot_db::Database;
use carrot_db::models::{ListingFields, ListingRow};
use carrot_types::api::{
    Claims, ExistingListingsRequest, ExistingListingsResponse, ListingForm, ListingQuery,
    MAX_EXISTENCE_IDS, MyListingsResponse,
};
use carrot_types::models::{Listing, ListingWithSeller, User};

use crate::convert;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::{AppState, with_db};

/// Browse: every listing with its seller, then search, category filter and
/// sort. `ids` carries the caller's favorites for `filter=favorites`.
pub async fn browse(
    State(state): State<AppState>,
    Query(params): Query<ListingQuery>,
) -> Result<Json<Vec<ListingWithSeller>>, ApiError> {
    let query = CatalogQuery::from_params(&params);
    let favorites = catalog::parse_id_list(params.ids.as_deref());

    let items = with_db(&state, |db| {
        let rows = db.list_listings()?;
        Ok(with_sellers(db, rows))
    })
    .await?;

    Ok(Json(catalog::apply(items, &query, &favorites)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(form): ApiJson<ListingForm>,
) -> Result<impl IntoResponse, ApiError> {
    let valid = validate_listing(&form)?;
    let id = Uuid::new_v4().to_string();
    let owner = claims.sub.to_string();
    let created_at = convert::now_string(Utc::now());

    let row = with_db(&state, move |db| {
        db.insert_listing(&id, &owner, &fields(&valid), &created_at)?;
        db.get_listing(&id)
    })
    .await?
    .ok_or(ApiError::NotFound(messages::LISTING_NOT_FOUND))?;

    let listing = convert::listing(row)?;
    info!("Listing created: {} by {}", listing.id, claims.nickname);
    Ok((StatusCode::CREATED, Json(listing)))
}

/// Which of the given ids still have a listing.
pub async fn existing(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ExistingListingsRequest>,
) -> Result<Json<ExistingListingsResponse>, ApiError> {
    if req.ids.len() > MAX_EXISTENCE_IDS {
        return Err(ApiError::BadRequest);
    }
    let ids = with_db(&state, move |db| db.existing_listing_ids(&req.ids)).await?;
    Ok(Json(ExistingListingsResponse { ids }))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> Result<Json<ListingWithSeller>, ApiError> {
    let (row, seller) = with_db(&state, move |db| {
        let Some(row) = db.get_listing(&listing_id)? else {
            return Ok(None);
        };
        let seller = match db.get_user_by_id(&row.user_id) {
            Ok(seller) => seller,
            Err(e) => {
                warn!("Seller lookup failed for listing {}: {:#}", row.id, e);
                None
            }
        };
        Ok(Some((row, seller)))
    })
    .await?
    .ok_or(ApiError::NotFound(messages::LISTING_NOT_FOUND))?;

    let listing = convert::listing(row)?;
    let seller = seller.and_then(|row| convert::user(row).ok());
    Ok(Json(ListingWithSeller {
        listing,
        seller: display::seller_detail(seller.as_ref()),
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<String>,
    ApiJson(form): ApiJson<ListingForm>,
) -> Result<Json<Listing>, ApiError> {
    let valid = validate_listing(&form)?;
    let owner = claims.sub.to_string();

    let row = with_db(&state, move |db| db.update_listing(&listing_id, &owner, &fields(&valid)))
        .await?
        .ok_or(ApiError::NotFound(messages::LISTING_NOT_OWNED))?;

    let listing = convert::listing(row)?;
    info!("Listing updated: {}", listing.id);
    Ok(Json(listing))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let owner = claims.sub.to_string();
    let id = listing_id.clone();
    let removed = with_db(&state, move |db| db.delete_listing(&id, &owner)).await?;
    if !removed {
        return Err(ApiError::NotFound(messages::LISTING_NOT_OWNED));
    }
    info!("Listing deleted: {}", listing_id);
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's own listings, newest first, with a count for the profile.
pub async fn mine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MyListingsResponse>, ApiError> {
    let owner = claims.sub.to_string();
    let listings = with_db(&state, move |db| {
        let rows = db.list_listings_by_user(&owner)?;
        Ok(with_sellers(db, rows))
    })
    .await?;

    Ok(Json(MyListingsResponse {
        count: listings.len(),
        listings,
    }))
}

/// Owner-scoped fetch used to pre-fill the edit form.
pub async fn mine_one(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(listing_id): Path<String>,
) -> Result<Json<Listing>, ApiError> {
    let owner = claims.sub.to_string();
    let row = with_db(&state, move |db| db.get_owned_listing(&listing_id, &owner))
        .await?
        .ok_or(ApiError::NotFound(messages::LISTING_NOT_OWNED))?;
    Ok(Json(convert::listing(row)?))
}

fn fields(valid: &ValidListing) -> ListingFields<'_> {
    ListingFields {
        title: &valid.title,
        description: &valid.description,
        price: valid.price,
        trade_type: valid.trade_type.as_str(),
        image: &valid.image,
    }
}

/// Attaches sellers with one batched lookup. If the lookup fails every
/// listing gets the placeholder seller.
fn with_sellers(db: &Database, rows: Vec<ListingRow>) -> Vec<ListingWithSeller> {
    let listings = convert::all(rows, convert::listing);

    let mut owner_ids: Vec<String> = listings.iter().map(|l| l.user_id.to_string()).collect();
    owner_ids.sort();
    owner_ids.dedup();

    let sellers: HashMap<Uuid, User> = match db.get_users_by_ids(&owner_ids) {
        Ok(rows) => convert::all(rows, convert::user)
            .into_iter()
            .map(|user| (user.id, user))
            .collect(),
        Err(e) => {
            warn!("Seller lookup failed, using placeholders: {:#}", e);
            HashMap::new()
        }
    };

    listings
        .into_iter()
        .map(|listing| {
            let seller = display::seller_summary(sellers.get(&listing.user_id), &listing.user_id);
            ListingWithSeller { listing, seller }
        })
        .collect()
}
