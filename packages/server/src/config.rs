//! Command-line configuration.

use clap::Parser;

/// Server options
#[derive(Debug, Clone, Parser)]
#[command(
    name = "kyoshitsu-server",
    version,
    about = "Live classroom polling and chat server"
)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
