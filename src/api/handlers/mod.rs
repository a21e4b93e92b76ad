pub mod books;
pub mod system;

pub use books::*;
pub use system::*;

use crate::db::repository::BookRepository;
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub book_repo: Arc<BookRepository>,
}
