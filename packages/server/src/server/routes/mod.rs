// HTTP routes
pub mod health;
pub mod pull_requests;
pub mod stats;
pub mod team;
pub mod users;

pub use health::health_handler;
