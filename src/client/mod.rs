//! Offline-First Client Module
//!
//! The client core: report submission, the durable offline queue and the
//! sync engine that drains it. UI layers (the `fieldreport` CLI, or any
//! other host) only wire signals into this module and display the
//! notifications it emits.
//!
//! # Architecture
//!
//! - **`config`** - Configuration management (server URL, database path, timeouts)
//! - **`error`** - Client error types
//! - **`api`** - `ReportApi` trait and its HTTP implementation
//! - **`local_db`** - SQLite key-value substrate
//! - **`offline`** - Queue store and the form's submit path
//! - **`sync`** - Sync engine and its trigger adapters
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - CLI entry point (binary)
//! ├── config.rs       - Configuration management
//! ├── error.rs        - Error types
//! ├── api.rs          - Report API client
//! ├── local_db/       - Key-value substrate
//! ├── offline/        - Queue store, submitter
//! └── sync/           - Sync engine, connectivity, lifecycle, notifications
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod local_db;
pub mod offline;
pub mod sync;

// Re-export commonly used types
pub use config::Config;
pub use offline::{QueueStore, ReportSubmitter, SubmissionOutcome};
pub use sync::{SyncEngine, SyncTrigger, TriggerOutcome};
