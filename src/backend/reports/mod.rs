//! Report Module
//!
//! Report intake and listing for the reference server.
//!
//! - **`state`** - In-memory report storage
//! - **`handlers`** - HTTP handlers
//! - **`html`** - HTML table rendering

pub mod state;

pub mod handlers;

pub mod html;

pub use state::ReportState;
