//! Database migrations
//!
//! Versioned schema bootstrap, tracked in the schema_migrations table.

use crate::core::error::{Result, ServiceError};
use rusqlite::Connection;
use tracing::info;

/// Migration version tracking table
const MIGRATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Initial schema migration (version 1)
const MIGRATION_V1: &str = r#"
-- Books table
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    published_date TEXT NOT NULL,
    isbn TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_books_isbn ON books(isbn);
"#;

/// Run all pending database migrations
///
/// Applies schema migrations in order, recording each applied version in the
/// schema_migrations table so reruns are no-ops.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    info!("Running database migrations");

    // Create migration tracking table
    conn.execute_batch(MIGRATION_TABLE)
        .map_err(ServiceError::Database)?;

    // Check current version
    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(ServiceError::Database)?;

    info!("Current database schema version: {}", current_version);

    // Apply migrations
    if current_version < 1 {
        info!("Applying migration v1: Initial schema");
        apply_migration(conn, 1, MIGRATION_V1)?;
    }

    info!("Database migrations completed successfully");
    Ok(())
}

/// Apply a single migration and record its version
fn apply_migration(conn: &mut Connection, version: i64, sql: &str) -> Result<()> {
    conn.execute_batch(sql).map_err(ServiceError::Database)?;

    conn.execute(
        "INSERT INTO schema_migrations (version) VALUES (?1)",
        [version],
    )
    .map_err(ServiceError::Database)?;

    info!("Migration v{} applied successfully", version);
    Ok(())
}
