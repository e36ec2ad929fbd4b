//! Backend Module
//!
//! Reference report server for the offline-first client. It accepts
//! reports over HTTP/JSON, keeps them in memory and serves them back as
//! JSON or as an HTML table.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state
//! - **`routes`** - Router assembly and middleware
//! - **`reports`** - Report handlers, storage and HTML rendering
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary entry point
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── reports/        - Report handlers and rendering
//! └── error/          - Error types
//! ```

pub mod server;
pub mod routes;
pub mod reports;
pub mod error;

// Re-export commonly used types
pub use server::{create_app, create_app_with_state, AppState};
pub use error::BackendError;
