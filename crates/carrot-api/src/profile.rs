use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::info;
use uuid::Uuid;

use carrot_core::messages;
use carrot_core::validation::validate_profile;
use carrot_db::queries::{TakenField, taken_field};
use carrot_types::api::{Claims, UpdateProfileRequest};
use carrot_types::models::User;

use crate::convert;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::{AppState, with_db};

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let id = user_id.to_string();
    let row = with_db(&state, move |db| db.get_user_by_id(&id))
        .await?
        .ok_or(ApiError::NotFound(messages::USER_NOT_FOUND))?;
    Ok(Json(convert::user(row)?))
}

/// Edits nickname, location and avatar. Unchanged submissions are rejected
/// and the nickname must stay unique among other users.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let id = claims.sub.to_string();
    let current = {
        let id = id.clone();
        with_db(&state, move |db| db.get_user_by_id(&id))
            .await?
            .ok_or(ApiError::NotFound(messages::USER_NOT_FOUND))?
    };
    let current = convert::user(current)?;
    let update = validate_profile(&req, &current)?;

    let row = with_db(&state, move |db| {
        if update.nickname != current.nickname && db.nickname_taken(&update.nickname, Some(&id))? {
            return Ok(Err(ApiError::Conflict(messages::NICKNAME_TAKEN)));
        }
        let row = match db.update_profile(
            &id,
            &update.nickname,
            &update.location,
            update.avatar_url.as_deref(),
        ) {
            Ok(row) => row,
            Err(e) if taken_field(&e) == Some(TakenField::Nickname) => {
                return Ok(Err(ApiError::Conflict(messages::NICKNAME_TAKEN)));
            }
            Err(e) => return Err(e),
        };
        Ok(row.ok_or(ApiError::NotFound(messages::USER_NOT_FOUND)))
    })
    .await??;

    let user = convert::user(row)?;
    info!("Profile updated: {}", user.id);
    Ok(Json(user))
}
