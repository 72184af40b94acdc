//! WebSocket classroom server implementation.

mod handler;
mod runner;
mod signal;
pub mod state; // integration tests build their own AppState

pub use runner::{build_router, run, serve};
