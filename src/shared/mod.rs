//! Shared Module
//!
//! Types shared between the client and the reference backend. Report
//! payloads travel over HTTP as JSON, so everything here is designed for
//! serialization.

/// Report data structures
pub mod report;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use report::{Category, Priority, Report, ReportDraft, ReportPayload, ANONYMOUS_REPORTER, PENDING_REVIEW};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
