//! End-to-end tests
//!
//! The HTTP client, submitter and sync engine against a real report server
//! bound to an ephemeral local port.
