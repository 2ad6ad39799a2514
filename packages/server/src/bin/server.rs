//! Kokuban collaborative session server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kokuban-server
//! ```

use clap::Parser;

use kokuban_server::{ServerConfig, run};
use kokuban_shared::logger::setup_logger;

#[derive(Debug, Parser)]
#[command(name = "kokuban-server", about = "Collaborative session server")]
struct Args {
    /// Host address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Run the server
    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };
    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
