//! Property-based tests
//!
//! Uses proptest to generate queue contents and remote outcomes
