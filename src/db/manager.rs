//! Database manager implementation
//!
//! SQLite connection pool using r2d2, with an async wrapper that moves
//! database work onto the blocking thread pool.

use crate::core::error::{Result, ServiceError};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task;

/// Database manager with connection pool
pub struct DatabaseManager {
    pool: Pool<SqliteConnectionManager>,
    db_path: PathBuf,
}

impl DatabaseManager {
    /// Create a new DatabaseManager with the specified database path and pool size
    pub fn new(db_path: &Path, pool_size: u32, busy_timeout: Duration) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(ServiceError::Io)?;
        }

        // Create connection manager
        let manager = SqliteConnectionManager::file(db_path)
            .with_init(move |conn| {
                // Enable foreign keys
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                // Set busy timeout
                conn.busy_timeout(busy_timeout)?;
                // Enable WAL mode for better concurrency
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                Ok(())
            });

        // Build connection pool
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(Duration::from_secs(30))
            .build(manager)
            .map_err(|e| ServiceError::Store(format!("Failed to build connection pool: {}", e)))?;

        let manager = Self {
            pool,
            db_path: db_path.to_path_buf(),
        };

        // Run migrations on initialization
        manager.migrate()?;

        Ok(manager)
    }

    /// Create a new DatabaseManager with an in-memory database for testing
    pub fn new_in_memory() -> Result<Self> {
        // Create connection manager for in-memory database
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| {
                // Enable foreign keys
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                Ok(())
            });

        // In-memory databases should use a single connection
        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(30))
            .build(manager)
            .map_err(|e| ServiceError::Store(format!("Failed to build connection pool: {}", e)))?;

        let manager = Self {
            pool,
            db_path: PathBuf::from(":memory:"),
        };

        // Run migrations on initialization
        manager.migrate()?;

        Ok(manager)
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            ServiceError::Store(format!("Failed to get connection from pool: {}", e))
        })
    }

    /// Execute a database operation asynchronously
    ///
    /// This wraps synchronous database operations in tokio::task::spawn_blocking
    /// to avoid blocking the async runtime.
    pub async fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| {
                ServiceError::Store(format!("Failed to get connection from pool: {}", e))
            })?;
            f(&conn)
        })
        .await
        .map_err(|e| ServiceError::Store(format!("Database task panicked: {}", e)))?
    }

    /// Execute database migrations
    pub fn migrate(&self) -> Result<()> {
        let mut conn = self.get_connection()?;
        crate::db::migrations::run_migrations(&mut conn)
    }

    /// Get the database file path
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl Clone for DatabaseManager {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            db_path: self.db_path.clone(),
        }
    }
}
