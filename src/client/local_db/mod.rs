//! # Local Database Module
//!
//! Durable on-device storage for the offline-first client. The database is a
//! plain string-keyed key-value table; the offline queue and the remembered
//! reporter name each live under one reserved key.
//!
//! ## Key Components
//!
//! - `LocalDatabase`: SQLite connection pool and schema management
//! - `kv.rs`: the `KeyValueStore` trait, its SQLite implementation and the
//!   in-process `MemoryStore`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldreport::client::local_db::{KeyValueStore, LocalDatabase};
//!
//! # async fn example() -> Result<(), fieldreport::client::error::StorageError> {
//! let db = LocalDatabase::open("/tmp/fieldreport/queue.db").await?;
//! db.set("userReporterName", "Dana").await?;
//! assert_eq!(db.get("userReporterName").await?, Some("Dana".to_string()));
//! # Ok(())
//! # }
//! ```

pub mod kv;

pub use kv::{KeyValueStore, KvUpdate, MemoryStore, Updater};

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

use crate::client::error::StorageError;

/// Result type for local database operations
pub type Result<T> = std::result::Result<T, StorageError>;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS schema_migrations (
        version INTEGER PRIMARY KEY,
        applied_at TEXT NOT NULL
    )",
];

const SCHEMA_VERSION: i64 = 1;

/// Local database connection manager
#[derive(Debug, Clone)]
pub struct LocalDatabase {
    pool: SqlitePool,
}

impl LocalDatabase {
    /// Open or create the database file
    ///
    /// Creates parent directories as needed. Uses WAL mode so readers never
    /// observe a half-written value.
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::backend(format!("{}: {}", parent.display(), e)))?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", db_path.to_string_lossy());
        let pool = SqlitePool::connect(&database_url).await?;

        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::debug!("Opened local database at {}", db_path.display());
        Ok(db)
    }

    /// Open a private in-memory database
    ///
    /// The pool is pinned to one connection that never expires, since each
    /// SQLite in-memory connection is a separate database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        self.run_migrations().await
    }

    async fn run_migrations(&self) -> Result<()> {
        let current_version: (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        if current_version.0 < SCHEMA_VERSION {
            sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                .bind(SCHEMA_VERSION)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&self.pool)
                .await?;
            tracing::info!("Applied local schema migration {}", SCHEMA_VERSION);
        }

        Ok(())
    }

    /// Get connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
