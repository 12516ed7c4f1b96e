use biblios_db::Database;
use biblios_db::models::UserRow;
use biblios_types::api::Claims;

use crate::error::ApiError;

/// Resolve the authenticated principal to its persisted user record.
/// Fails with NotFound when the token references a since-deleted user.
pub fn resolve_current_user(db: &Database, claims: &Claims) -> Result<UserRow, ApiError> {
    db.get_user_by_email(&claims.email)?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))
}

pub fn get_user_by_id(db: &Database, id: &str) -> Result<UserRow, ApiError> {
    db.get_user_by_id(id)?
        .ok_or_else(|| ApiError::NotFound(format!("user not found with id: {}", id)))
}
