//! Reviewer Assignment Engine
//!
//! Assigns code reviewers to pull requests inside fixed teams and keeps those
//! assignments consistent when reviewers are swapped or deactivated.
//!
//! # Usage
//!
//! ```rust,ignore
//! use assignment::{AssignmentEngine, MemoryStore, NewPullRequest};
//!
//! let engine = AssignmentEngine::new(MemoryStore::new());
//! let pr = engine
//!     .create_pr(NewPullRequest::new("pr-1", "Add search", "u1"))
//!     .await?;
//! assert!(pr.assigned_reviewers.len() <= 2);
//! ```
//!
//! # Modules
//!
//! - [`types`] - Data model (teams, users, pull requests, statistics)
//! - [`traits`] - Store and randomness abstractions
//! - [`selector`] - Pure candidate selection
//! - [`engine`] - Assignment, reassignment and bulk deactivation
//! - [`report`] - Result shapes returned to callers
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`testing`] - Deterministic randomness and fault injection for tests

pub mod engine;
pub mod error;
pub mod report;
pub mod selector;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use engine::{AssignmentEngine, NewPullRequest};
pub use error::{AssignmentError, ErrorKind, Result};
pub use report::{
    BulkDeactivateResponse, FailedReassignment, ReassignResponse, ReassignedPrDetail,
    UserPullRequests, UserReplacement,
};
pub use stores::MemoryStore;
pub use traits::{
    random::{RandomSource, ThreadRandom},
    store::{ReviewStore, StoreTransaction},
};
pub use types::{
    ids::{PullRequestId, TeamName, UserId},
    key::Key,
    pull_request::{PullRequest, PullRequestShort, PullRequestStatus},
    stats::{PrStat, StatsResponse, StatsSummary, UserStat},
    team::{Team, TeamMember, User},
};

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;
