//! Shared utilities for Kyoshitsu.
//!
//! Logging setup and time helpers used by the server binary and its tests.

pub mod logger;
pub mod time;
