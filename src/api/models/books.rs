use crate::db::models::{Book, BookDraft};
use serde::{Deserialize, Serialize};

// Book API models

/// Request body for creating or replacing a book
///
/// Carries every field except the id; a client-supplied id in the body is
/// ignored (the store assigns ids on creation, and PUT takes the id from the
/// path).
#[derive(Debug, Clone, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub published_date: String,
    pub isbn: String,
}

impl From<BookPayload> for BookDraft {
    fn from(payload: BookPayload) -> Self {
        BookDraft {
            title: payload.title,
            author: payload.author,
            published_date: payload.published_date,
            isbn: payload.isbn,
        }
    }
}

/// Wire representation of a book
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub published_date: String,
    pub isbn: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        BookResponse {
            id: book.id,
            title: book.title,
            author: book.author,
            published_date: book.published_date,
            isbn: book.isbn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_ignores_client_supplied_id() {
        let payload: BookPayload = serde_json::from_str(
            r#"{"id": 999, "title": "Dune", "author": "Frank Herbert",
                "published_date": "1965-08-01", "isbn": "9780441013593"}"#,
        )
        .unwrap();

        assert_eq!(payload.title, "Dune");
    }

    #[test]
    fn test_payload_requires_all_fields() {
        let result: std::result::Result<BookPayload, _> =
            serde_json::from_str(r#"{"title": "Dune"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_book_response_wire_shape() {
        let response = BookResponse::from(Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            published_date: "1965-08-01".to_string(),
            isbn: "9780441013593".to_string(),
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "title": "Dune",
                "author": "Frank Herbert",
                "published_date": "1965-08-01",
                "isbn": "9780441013593",
            })
        );
    }
}
