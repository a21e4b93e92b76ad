use crate::api::models::{BookPayload, BookResponse};
use crate::core::error::{Result, ServiceError};
use crate::db::repository::BookStore;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::AppState;

/// Handler for GET /books - List all books
pub async fn list_books(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let books = state.book_repo.find_all().await?;

    let responses: Vec<BookResponse> = books.into_iter().map(BookResponse::from).collect();

    Ok(Json(responses))
}

/// Handler for GET /books/:id - Get book by id
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_book_id(&id)?;

    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Book with id {} not found", id)))?;

    Ok((StatusCode::OK, Json(BookResponse::from(book))))
}

/// Handler for POST /books - Create a new book
pub async fn create_book(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BookPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload.map_err(reject_body)?;

    let book = state.book_repo.insert(&payload.into()).await?;

    Ok((StatusCode::OK, Json(BookResponse::from(book))))
}

/// Handler for PUT /books/:id - Replace a book
///
/// The id always comes from the path, never from the body. Replacing an id
/// with no matching row is accepted and answered with the attempted payload.
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<BookPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let id = parse_book_id(&id)?;
    let Json(payload) = payload.map_err(reject_body)?;

    let book = state.book_repo.update(id, &payload.into()).await?;

    Ok((StatusCode::OK, Json(BookResponse::from(book))))
}

/// Handler for DELETE /books/:id - Delete a book
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_book_id(&id)?;

    state.book_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Parse the `{id}` path segment as an integer primary key
fn parse_book_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|e| ServiceError::Validation(format!("Invalid book id '{}': {}", raw, e)))
}

/// Map a body-decode rejection to a 400 (axum's default would be 422)
fn reject_body(rejection: JsonRejection) -> ServiceError {
    ServiceError::Validation(format!("Failed to decode request body: {}", rejection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::build_api_routes;
    use crate::db::manager::DatabaseManager;
    use crate::db::repository::BookRepository;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::util::ServiceExt; // For oneshot method

    fn test_app() -> Router {
        let db = Arc::new(DatabaseManager::new_in_memory().unwrap());
        let state = AppState {
            book_repo: Arc::new(BookRepository::new(db)),
        };
        build_api_routes(state)
    }

    fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn dune() -> Value {
        json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "published_date": "1965-08-01",
            "isbn": "9780441013593",
        })
    }

    #[tokio::test]
    async fn test_list_books_empty() {
        let app = test_app();

        let response = app.oneshot(empty_request(Method::GET, "/books")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_create_and_fetch_book() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/books", &dune()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let created = response_json(response).await;
        let id = created["id"].as_i64().unwrap();
        assert!(id > 0);
        assert_eq!(created["title"], "Dune");
        assert_eq!(created["author"], "Frank Herbert");
        assert_eq!(created["published_date"], "1965-08-01");
        assert_eq!(created["isbn"], "9780441013593");

        let response = app
            .oneshot(empty_request(Method::GET, &format!("/books/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_json(response).await, created);
    }

    #[tokio::test]
    async fn test_create_ignores_client_supplied_id() {
        let app = test_app();

        let mut payload = dune();
        payload["id"] = json!(999);

        let response = app
            .oneshot(json_request(Method::POST, "/books", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let created = response_json(response).await;
        assert_eq!(created["id"], 1);
    }

    #[tokio::test]
    async fn test_create_with_malformed_body_returns_400() {
        let app = test_app();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/books")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["error"], "ValidationError");
    }

    #[tokio::test]
    async fn test_get_with_non_numeric_id_returns_400() {
        let app = test_app();

        let response = app
            .oneshot(empty_request(Method::GET, "/books/abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response_json(response).await;
        assert_eq!(body["error"], "ValidationError");
    }

    #[tokio::test]
    async fn test_get_missing_book_returns_404() {
        let app = test_app();

        let response = app
            .oneshot(empty_request(Method::GET, "/books/42"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response_json(response).await;
        assert_eq!(body["error"], "NotFoundError");
    }

    #[tokio::test]
    async fn test_list_reflects_insert_and_delete() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/books", &dune()))
            .await
            .unwrap();
        let id = response_json(response).await["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, "/books"))
            .await
            .unwrap();
        let books = response_json(response).await;
        assert_eq!(books.as_array().unwrap().len(), 1);
        assert_eq!(books[0]["isbn"], "9780441013593");

        let response = app
            .clone()
            .oneshot(empty_request(Method::DELETE, &format!("/books/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(empty_request(Method::GET, "/books"))
            .await
            .unwrap();
        assert_eq!(response_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/books", &dune()))
            .await
            .unwrap();
        let id = response_json(response).await["id"].as_i64().unwrap();

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(empty_request(Method::DELETE, &format!("/books/{}", id)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }
    }

    #[tokio::test]
    async fn test_delete_with_non_numeric_id_returns_400() {
        let app = test_app();

        let response = app
            .oneshot(empty_request(Method::DELETE, "/books/abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // Pins the accepted behavior for PUT on an id with no matching row:
    // 200 with the attempted payload, not 404.
    #[tokio::test]
    async fn test_put_unknown_id_returns_payload() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request(Method::PUT, "/books/42", &dune()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["id"], 42);
        assert_eq!(body["title"], "Dune");

        // The store remains untouched
        let response = app
            .oneshot(empty_request(Method::GET, "/books/42"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // The concrete scenario from the service contract, end to end.
    #[tokio::test]
    async fn test_full_crud_scenario() {
        let app = test_app();

        // Create
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/books", &dune()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = response_json(response).await;
        let id = created["id"].as_i64().unwrap();
        assert!(id > 0);

        // Read back the identical object
        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, &format!("/books/{}", id)))
            .await
            .unwrap();
        assert_eq!(response_json(response).await, created);

        // Update the title
        let mut second_edition = dune();
        second_edition["title"] = json!("Dune (2nd ed)");
        let response = app
            .clone()
            .oneshot(json_request(Method::PUT, &format!("/books/{}", id), &second_edition))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = response_json(response).await;
        assert_eq!(updated["id"], id);
        assert_eq!(updated["title"], "Dune (2nd ed)");

        // Delete
        let response = app
            .clone()
            .oneshot(empty_request(Method::DELETE, &format!("/books/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Gone
        let response = app
            .oneshot(empty_request(Method::GET, &format!("/books/{}", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unmatched_route_falls_through_to_404() {
        let app = test_app();

        let response = app
            .oneshot(empty_request(Method::GET, "/shelves"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
