//! Infrastructure layer: storage, wire DTOs and event delivery.

pub mod broadcast;
pub mod dto;
pub mod repository;

pub use broadcast::BroadcastHub;
