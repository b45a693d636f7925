//! Data model shared by the engine, the stores and the HTTP layer.

pub mod ids;
pub mod key;
pub mod pull_request;
pub mod stats;
pub mod team;
