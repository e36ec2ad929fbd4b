//! Server Module
//!
//! Server initialization and shared application state.
//!
//! - **`state`** - `AppState` shared by handlers
//! - **`init`** - Application creation
//!
//! # Example
//!
//! ```rust,no_run
//! use fieldreport::backend::server::create_app;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app().await;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use init::{create_app, create_app_with_state};
pub use state::AppState;
