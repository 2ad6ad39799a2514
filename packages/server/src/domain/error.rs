//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ConnectionId validation error
    #[error("ConnectionId cannot be empty")]
    ConnectionIdEmpty,

    /// RoomKey validation error
    #[error("RoomKey cannot be empty")]
    RoomKeyEmpty,

    /// RoomKey must be the literal of a non-negative integer
    #[error("RoomKey must be a non-negative integer literal (got: {0})")]
    RoomKeyNotNumeric(String),
}
