use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};
use uuid::Uuid;

use carrot_core::messages;
use carrot_core::validation::validate_signup;
use carrot_db::models::NewUser;
use carrot_db::queries::{TakenField, taken_field};
use carrot_types::api::{Claims, LoginRequest, LoginResponse, SignupRequest};
use carrot_types::models::User;

use crate::convert;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::{AppState, with_db};

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(mut req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.location.trim().is_empty() {
        req.location = messages::DEFAULT_LOCATION.to_string();
    }
    validate_signup(&req)?;

    let email = req.email.trim().to_string();
    let nickname = req.nickname.trim().to_string();
    let location = req.location.trim().to_string();

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4().to_string();
    let created_at = convert::now_string(Utc::now());

    let row = with_db(&state, move |db| {
        if db.email_exists(&email)? {
            return Ok(Err(ApiError::Conflict(messages::EMAIL_TAKEN)));
        }
        if db.nickname_taken(&nickname, None)? {
            return Ok(Err(ApiError::Conflict(messages::NICKNAME_TAKEN)));
        }
        let created = db.create_user(&NewUser {
            id: &user_id,
            email: &email,
            password_hash: &password_hash,
            nickname: &nickname,
            location: &location,
            created_at: &created_at,
        });
        // A concurrent signup can claim the email or nickname after the checks.
        if let Err(e) = created {
            return match taken_field(&e) {
                Some(TakenField::Email) => Ok(Err(ApiError::Conflict(messages::EMAIL_TAKEN))),
                Some(TakenField::Nickname) => Ok(Err(ApiError::Conflict(messages::NICKNAME_TAKEN))),
                None => Err(e),
            };
        }
        Ok(db.get_user_by_id(&user_id)?.ok_or(ApiError::NotFound(messages::USER_NOT_FOUND)))
    })
    .await??;

    let user = convert::user(row)?;
    info!("User signed up: {} ({})", user.nickname, user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = req.email.trim().to_string();
    let row = with_db(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&row.password_hash)
        .map_err(|e| anyhow::anyhow!("stored password hash unreadable: {}", e))?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!("Failed login for {}", row.email);
        return Err(ApiError::InvalidCredentials);
    }

    let user = convert::user(row)?;
    let expires_at = Utc::now() + state.session_ttl;
    let token = create_token(&state.jwt_secret, &user, expires_at)?;

    info!("User logged in: {}", user.nickname);
    Ok(Json(LoginResponse {
        token,
        expires_at,
        user,
    }))
}

/// Current user for the bearer token, used to restore a stored session.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<User>, ApiError> {
    let id = claims.sub.to_string();
    let row = with_db(&state, move |db| db.get_user_by_id(&id))
        .await?
        .ok_or(ApiError::NotFound(messages::USER_NOT_FOUND))?;
    Ok(Json(convert::user(row)?))
}

pub fn create_token(secret: &str, user: &User, expires_at: DateTime<Utc>) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        nickname: user.nickname.clone(),
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
