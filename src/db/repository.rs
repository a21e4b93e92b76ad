//! Repository pattern implementation for data access layer
//!
//! Each operation issues exactly one statement against the shared pool; no
//! transactions span multiple operations and nothing is retried.

use crate::core::error::{Result, ServiceError};
use crate::db::manager::DatabaseManager;
use crate::db::models::{Book, BookDraft};
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use std::sync::Arc;

/// Primitive store operations over book records
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Find every book, store default order
    async fn find_all(&self) -> Result<Vec<Book>>;

    /// Point lookup by primary key; Ok(None) when no record matches
    async fn find_by_id(&self, id: i64) -> Result<Option<Book>>;

    /// Insert a new record; the store assigns the id
    async fn insert(&self, draft: &BookDraft) -> Result<Book>;

    /// Replace all fields except the id for the record matching `id`
    ///
    /// A blind UPDATE: succeeds whether or not a row matched.
    async fn update(&self, id: i64, draft: &BookDraft) -> Result<Book>;

    /// Remove the record if present; succeeds unconditionally
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLite-backed repository for Book entities
pub struct BookRepository {
    db: Arc<DatabaseManager>,
}

impl BookRepository {
    /// Create a new BookRepository
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    /// Get a reference to the database manager
    pub fn db(&self) -> &Arc<DatabaseManager> {
        &self.db
    }
}

fn row_to_book(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        published_date: row.get(3)?,
        isbn: row.get(4)?,
    })
}

#[async_trait]
impl BookStore for BookRepository {
    async fn find_all(&self) -> Result<Vec<Book>> {
        self.db.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, author, published_date, isbn FROM books"
            ).map_err(ServiceError::Database)?;

            let books = stmt.query_map([], row_to_book)
                .map_err(ServiceError::Database)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(ServiceError::Database)?;

            Ok(books)
        }).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Book>> {
        self.db.execute(move |conn| {
            conn.query_row(
                "SELECT id, title, author, published_date, isbn FROM books WHERE id = ?1",
                [id],
                row_to_book,
            ).optional()
            .map_err(ServiceError::Database)
        }).await
    }

    async fn insert(&self, draft: &BookDraft) -> Result<Book> {
        let draft = draft.clone();
        self.db.execute(move |conn| {
            conn.execute(
                "INSERT INTO books (title, author, published_date, isbn) VALUES (?1, ?2, ?3, ?4)",
                params![draft.title, draft.author, draft.published_date, draft.isbn],
            ).map_err(ServiceError::Database)?;

            let id = conn.last_insert_rowid();

            Ok(Book {
                id,
                title: draft.title,
                author: draft.author,
                published_date: draft.published_date,
                isbn: draft.isbn,
            })
        }).await
    }

    async fn update(&self, id: i64, draft: &BookDraft) -> Result<Book> {
        let draft = draft.clone();
        self.db.execute(move |conn| {
            // Blind update: zero matched rows is not distinguished from one
            conn.execute(
                "UPDATE books SET title = ?1, author = ?2, published_date = ?3, isbn = ?4 WHERE id = ?5",
                params![draft.title, draft.author, draft.published_date, draft.isbn, id],
            ).map_err(ServiceError::Database)?;

            Ok(Book {
                id,
                title: draft.title,
                author: draft.author,
                published_date: draft.published_date,
                isbn: draft.isbn,
            })
        }).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.db.execute(move |conn| {
            conn.execute("DELETE FROM books WHERE id = ?1", [id])
                .map_err(ServiceError::Database)?;
            Ok(())
        }).await
    }
}
