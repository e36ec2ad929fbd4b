//! Route Configuration Module
//!
//! - **`router`** - Router creation and middleware stack
//!
//! # Routes
//!
//! - `GET /` - Health probe
//! - `GET /reports` - JSON list of reports
//! - `POST /reports` - Create a report (201)
//! - `GET /reports/html` - HTML table of reports

/// Main router creation
pub mod router;

// Re-export commonly used functions
pub use router::create_router;
