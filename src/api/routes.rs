//! API routes

use crate::api::handlers::{
    create_book, delete_book, get_book, list_books, update_book, AppState,
};
use axum::{routing::get, Router};

/// Build the API routes
///
/// Exact-path, method-sensitive dispatch; unmatched method/path combinations
/// fall through to axum's default not-found response.
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(state)
}
