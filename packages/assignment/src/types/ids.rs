//! Typed key definitions for all domain entities.
//!
//! ```rust
//! use assignment::{TeamName, UserId};
//!
//! let team = TeamName::from("backend");
//! let user = UserId::from("u1");
//! // let wrong: UserId = team; // compile error
//! # let _ = (team, user);
//! ```

pub use super::key::Key;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for user entities (authors and reviewers).
pub struct UserEntity;

/// Marker type for pull request entities.
pub struct PullRequestEntity;

/// Marker type for team entities.
pub struct TeamEntity;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type UserId = Key<UserEntity>;

pub type PullRequestId = Key<PullRequestEntity>;

/// Teams are keyed by their unique name.
pub type TeamName = Key<TeamEntity>;
