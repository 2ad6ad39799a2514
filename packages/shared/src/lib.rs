//! Shared utilities for the Kokuban collaborative session server.
//!
//! Contains the pieces both the server and its tooling need:
//! logger setup and time helpers.

pub mod logger;
pub mod time;
