//! Database models
//!
//! Data structures representing database tables

use serde::{Deserialize, Serialize};

/// Book record in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub published_date: String,
    pub isbn: String,
}

/// Field set of a book before the store has assigned an id
///
/// Used as the payload for inserts and full-replacement updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub published_date: String,
    pub isbn: String,
}
