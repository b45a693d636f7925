//! Storage traits for teams, users, pull requests and reviewer links.
//!
//! The store is split in two:
//! - `ReviewStore`: pool-level operations, each one atomic on its own
//! - `StoreTransaction`: operations scoped to one transaction, used where the
//!   engine needs a consistent snapshot across several reads and writes
//!
//! Dropping a `StoreTransaction` without calling `commit` discards its writes.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    ids::{PullRequestId, TeamName, UserId},
    pull_request::{PullRequest, PullRequestShort, PullRequestStatus},
    stats::StatsResponse,
    team::{Team, User},
};

/// Durable records the engine reads and writes.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    type Transaction: StoreTransaction;

    /// Start a transaction.
    async fn begin(&self) -> Result<Self::Transaction>;

    /// Check the backing storage is reachable.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    // Teams

    async fn team_exists(&self, team_name: &TeamName) -> Result<bool>;

    /// Insert the team and all of its members atomically.
    async fn create_team(&self, team: &Team) -> Result<()>;

    /// Team with every member, active or not. Members are ordered by user id.
    async fn get_team(&self, team_name: &TeamName) -> Result<Option<Team>>;

    // Users

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Active members of a team, ordered by user id.
    async fn get_active_users_by_team(&self, team_name: &TeamName) -> Result<Vec<User>>;

    /// True when the user exists and belongs to a team other than `team_name`.
    async fn is_user_in_other_team(&self, user_id: &UserId, team_name: &TeamName) -> Result<bool>;

    async fn update_user_active(&self, user_id: &UserId, is_active: bool) -> Result<()>;

    // Pull requests

    async fn pr_exists(&self, pr_id: &PullRequestId) -> Result<bool>;

    /// Insert the pull request row and its reviewer links atomically.
    ///
    /// Fails with `AssignmentError::PrExists` if the id is taken.
    async fn create_pr(&self, pr: &PullRequest) -> Result<()>;

    /// Pull request with its reviewers in slot order.
    async fn get_pr(&self, pr_id: &PullRequestId) -> Result<Option<PullRequest>>;

    /// Set the status; moving to `Merged` stamps `merged_at`.
    async fn update_pr_status(&self, pr_id: &PullRequestId, status: PullRequestStatus)
        -> Result<()>;

    /// Replace all reviewers of a pull request.
    async fn update_pr_reviewers(&self, pr_id: &PullRequestId, reviewers: &[UserId])
        -> Result<()>;

    /// Every pull request the user reviews, newest first.
    async fn get_prs_by_reviewer(&self, user_id: &UserId) -> Result<Vec<PullRequestShort>>;

    // Statistics

    async fn assignment_stats(&self) -> Result<StatsResponse>;
}

/// Transaction-scoped reads and writes.
///
/// Reads inside a transaction see its own uncommitted writes. Rows read
/// through `*_for_update` and `get_active_users_by_team` stay locked until
/// commit or rollback.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn team_exists(&mut self, team_name: &TeamName) -> Result<bool>;

    async fn get_user(&mut self, user_id: &UserId) -> Result<Option<User>>;

    /// Active members of a team, ordered by user id.
    async fn get_active_users_by_team(&mut self, team_name: &TeamName) -> Result<Vec<User>>;

    /// Load a pull request and lock it against concurrent writers.
    async fn get_pr_for_update(&mut self, pr_id: &PullRequestId) -> Result<Option<PullRequest>>;

    /// Open pull requests with at least one reviewer in `user_ids`, ordered by id.
    async fn get_open_prs_reviewed_by(&mut self, user_ids: &[UserId]) -> Result<Vec<PullRequest>>;

    async fn update_pr_reviewers(&mut self, pr_id: &PullRequestId, reviewers: &[UserId])
        -> Result<()>;

    async fn update_user_active(&mut self, user_id: &UserId, is_active: bool) -> Result<()>;

    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;
}
