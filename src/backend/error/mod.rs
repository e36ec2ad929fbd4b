//! Backend Error Module
//!
//! - **`types`** - `BackendError` and its status code mapping
//! - **`conversion`** - `IntoResponse` and extractor rejection conversions

pub mod types;

pub mod conversion;

pub use types::BackendError;
