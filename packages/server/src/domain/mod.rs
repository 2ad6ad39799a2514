//! Domain layer for the collaborative session server.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use entity::{Drawing, DrawingLog, Membership, Room, Session};
pub use error::ValueObjectError;
pub use repository::{ConnectionRegistry, RoomStore};
pub use value_object::{ConnectionId, RoomKey, Timestamp};
