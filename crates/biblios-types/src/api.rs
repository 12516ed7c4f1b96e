use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// JWT claims shared between token issuance (auth handlers) and the bearer
/// guard. Canonical definition lives here in biblios-types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Shared response shape for both signup and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub token: String,
}

// -- Books --

/// Create/update payload. Unknown fields (a client echoing back id, owner or
/// timestamps) are ignored rather than rejected; ownership and timestamps are
/// always server-assigned.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub published_year: i32,
    pub category: String,
    pub rating: Option<f64>,
}

/// Transfer object exposed over the API, distinct from the persisted row.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub published_year: i32,
    pub category: String,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
