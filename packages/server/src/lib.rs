//! Live classroom polling and chat server.
//!
//! A teacher creates timed multiple-choice polls, students answer while
//! connected, and everyone sees live results and a chat channel over a
//! WebSocket connection.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use error::ServerError;
pub use ui::run as run_server;
