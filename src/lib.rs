//! fieldreport - Offline-First Incident Reporting
//!
//! Field users file incident reports from a client that is frequently
//! offline. Reports that cannot be delivered immediately are queued
//! durably on-device and transmitted automatically once connectivity
//! returns, without duplication or loss.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between client and backend
//!   - Report payloads, drafts and stored reports
//!   - Error types
//!   - Application configuration
//!
//! - **`client`** - The offline-first client core
//!   - `local_db`: SQLite key-value substrate
//!   - `offline`: persisted queue store and the submission path
//!   - `sync`: sync engine, connectivity monitor, lifecycle signal, notifications
//!   - `api`: HTTP client for the report API
//!
//! - **`backend`** - Reference report server (only compiled with `ssr` feature)
//!
//! # Feature Flags
//!
//! - **`ssr`** - Enables the Axum reference backend and the `report-server` binary.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fieldreport::client::{
//!     api::HttpReportApi,
//!     local_db::MemoryStore,
//!     offline::QueueStore,
//!     sync::{SyncConfig, SyncEngine, SyncTrigger, TracingNotifier},
//! };
//! use fieldreport::client::Config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new();
//! let queue = Arc::new(QueueStore::new(Arc::new(MemoryStore::new())));
//! let api = Arc::new(HttpReportApi::new(&config)?);
//! let engine = SyncEngine::new(queue, api, Arc::new(TracingNotifier), SyncConfig::from(&config));
//!
//! engine.on_trigger(SyncTrigger::Manual).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The sync engine and queue store are `Send + Sync` and are shared through
//! `Arc`. At most one drain pass runs per engine at any time.

/// Shared types and data structures
pub mod shared;

/// Offline-first client core
pub mod client;

/// Reference backend server
#[cfg(feature = "ssr")]
pub mod backend;
