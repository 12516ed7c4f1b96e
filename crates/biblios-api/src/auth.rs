use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use biblios_db::Database;
use biblios_db::models::UserRow;
use biblios_types::api::{AuthResponse, Claims, LoginRequest, SignupRequest};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.username.trim().is_empty() {
        return Err(ApiError::Validation("username is required".into()));
    }
    if req.email.trim().is_empty() {
        return Err(ApiError::Validation("email is required".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }

    // Email is checked before username; both collisions are conflicts
    if state.db.get_user_by_email(&req.email)?.is_some() {
        return Err(ApiError::Conflict("email already in use".into()));
    }
    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Conflict("username already in use".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4();
    let now = chrono::Utc::now().to_rfc3339();

    state.db.create_user(&UserRow {
        id: user_id.to_string(),
        username: req.username.clone(),
        email: req.email.clone(),
        password: password_hash,
        created_at: now.clone(),
        updated_at: now,
    })?;

    let token = create_token(&state.jwt_secret, user_id, &req.email)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user_id,
            username: req.username,
            email: req.email,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_email(&req.email)?
        .ok_or(ApiError::InvalidCredentials)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("stored hash unreadable: {}", e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::InvalidCredentials)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("corrupt user id '{}': {}", user.id, e))?;

    let token = create_token(&state.jwt_secret, user_id, &user.email)?;

    Ok(Json(AuthResponse {
        id: user_id,
        username: user.username,
        email: user.email,
        token,
    }))
}

fn create_token(secret: &str, user_id: Uuid, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
