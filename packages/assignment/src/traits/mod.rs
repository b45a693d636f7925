//! Core trait abstractions for the assignment engine.
//!
//! Applications implement these to plug in storage and randomness.

pub mod random;
pub mod store;
