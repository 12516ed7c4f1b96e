use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use biblios_db::Database;
use biblios_db::models::BookRow;
use biblios_types::api::{BookPayload, BookResponse, Claims};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::users;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

pub async fn list_books(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = run_blocking(state, move |state| {
        let owner = users::resolve_current_user(&state.db, &claims)?;
        Ok(state.db.list_books_by_owner(&owner.id)?)
    })
    .await?;

    Ok(Json(rows.into_iter().map(to_response).collect::<Vec<_>>()))
}

pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = run_blocking(state, move |state| {
        let owner = users::resolve_current_user(&state.db, &claims)?;
        Ok(state.db.search_books(&owner.id, &params.query)?)
    })
    .await?;

    Ok(Json(rows.into_iter().map(to_response).collect::<Vec<_>>()))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let row = run_blocking(state, move |state| {
        let owner = users::resolve_current_user(&state.db, &claims)?;
        fetch_owned(&state.db, &id, &owner.id)
    })
    .await?;

    Ok(Json(to_response(row)))
}

pub async fn create_book(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<BookPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&payload)?;

    let row = run_blocking(state, move |state| {
        let owner = users::resolve_current_user(&state.db, &claims)?;
        let now = chrono::Utc::now().to_rfc3339();

        let row = BookRow {
            id: Uuid::new_v4().to_string(),
            title: payload.title,
            author: payload.author,
            cover_image: payload.cover_image,
            description: payload.description,
            isbn: payload.isbn,
            published_year: payload.published_year,
            category: payload.category,
            rating: payload.rating,
            user_id: owner.id,
            created_at: now.clone(),
            updated_at: now,
        };

        state.db.insert_book(&row)?;
        Ok(row)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<BookPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&payload)?;

    let row = run_blocking(state, move |state| {
        let owner = users::resolve_current_user(&state.db, &claims)?;
        let mut book = fetch_owned(&state.db, &id, &owner.id)?;

        // Owner and created_at are immutable; everything else is overwritten
        book.title = payload.title;
        book.author = payload.author;
        book.cover_image = payload.cover_image;
        book.description = payload.description;
        book.isbn = payload.isbn;
        book.published_year = payload.published_year;
        book.category = payload.category;
        book.rating = payload.rating;
        book.updated_at = chrono::Utc::now().to_rfc3339();

        state.db.update_book(&book)?;
        Ok(book)
    })
    .await?;

    Ok(Json(to_response(row)))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(state, move |state| {
        let owner = users::resolve_current_user(&state.db, &claims)?;
        let book = fetch_owned(&state.db, &id, &owner.id)?;
        state.db.delete_book(&book.id)?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Existence is confirmed before ownership: a missing id is NotFound, a book
/// owned by someone else is Forbidden.
fn fetch_owned(db: &Database, id: &str, owner_id: &str) -> Result<BookRow, ApiError> {
    let book = db
        .get_book(id)?
        .ok_or_else(|| ApiError::NotFound(format!("book not found with id: {}", id)))?;

    if book.user_id != owner_id {
        return Err(ApiError::Forbidden("you don't have access to this book".into()));
    }

    Ok(book)
}

fn validate(payload: &BookPayload) -> Result<(), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }
    if payload.author.trim().is_empty() {
        return Err(ApiError::Validation("author is required".into()));
    }
    if payload.category.trim().is_empty() {
        return Err(ApiError::Validation("category is required".into()));
    }
    if let Some(description) = &payload.description {
        if description.chars().count() < 10 {
            return Err(ApiError::Validation(
                "description must be at least 10 characters".into(),
            ));
        }
    }
    Ok(())
}

/// Run blocking DB work off the async runtime.
async fn run_blocking<T, F>(state: AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(AppState) -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
        })?
}

fn to_response(row: BookRow) -> BookResponse {
    BookResponse {
        id: row.id.parse().unwrap_or_else(|e| {
            warn!("Corrupt book id '{}': {}", row.id, e);
            Uuid::default()
        }),
        created_at: parse_timestamp(&row.created_at, &row.id),
        updated_at: parse_timestamp(&row.updated_at, &row.id),
        title: row.title,
        author: row.author,
        cover_image: row.cover_image,
        description: row.description,
        isbn: row.isbn,
        published_year: row.published_year,
        category: row.category,
        rating: row.rating,
    }
}

fn parse_timestamp(value: &str, book_id: &str) -> chrono::DateTime<chrono::Utc> {
    value.parse::<chrono::DateTime<chrono::Utc>>().unwrap_or_else(|e| {
        warn!("Corrupt timestamp '{}' on book '{}': {}", value, book_id, e);
        chrono::DateTime::default()
    })
}
