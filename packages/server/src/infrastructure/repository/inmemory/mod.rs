//! In-memory repository implementations backed by `HashMap`s behind
//! tokio mutexes.

pub mod registry;
pub mod room;

pub use registry::InMemoryConnectionRegistry;
pub use room::InMemoryRoomStore;
