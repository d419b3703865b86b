//! Playlist server client module.

pub mod api;
pub mod bridge;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use api::HttpBridge;
pub use bridge::{send_mutation, PersistenceBridge};
