pub mod auth;
pub mod books;
pub mod error;
pub mod middleware;
pub mod users;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

/// Assemble the full route table: public auth endpoints plus the
/// bearer-guarded book endpoints.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(books::search_books))
        .route(
            "/books/{id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
