//! Infrastructure layer: wire DTOs and repository implementations.

pub mod dto;
pub mod repository;
