//! Kokuban collaborative session server library.
//!
//! Clients join numbered rooms over WebSocket to exchange chat
//! messages, live cursor strokes, shared drawings and video frames.
//! The room/session state machine lives in the usecase layer and is
//! independent of the transport.

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use ui::{ServerConfig, run};
