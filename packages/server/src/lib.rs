// Library exports for the reviewer assignment service

pub mod config;
pub mod db;
pub mod server;

pub use config::*;
