//! WebSocket collaborative session server implementation.

mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{ServerConfig, run};
