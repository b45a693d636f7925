//! Testing utilities: deterministic randomness and fault injection.
//!
//! These let callers assert exact reviewer choices and verify that a failed
//! operation leaves the store untouched.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::error::{AssignmentError, Result};
use crate::traits::{
    random::RandomSource,
    store::{ReviewStore, StoreTransaction},
};
use crate::types::{
    ids::{PullRequestId, TeamName, UserId},
    pull_request::{PullRequest, PullRequestShort, PullRequestStatus},
    stats::StatsResponse,
    team::{Team, User},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Randomness
// ============================================================================

/// Randomness that follows a script.
///
/// `pick_index` returns the scripted values in order (reduced modulo `len`),
/// then `0` once the script runs out. `shuffle` rotates the slice left by the
/// configured amount; the default rotation of zero keeps the input order.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    picks: Mutex<VecDeque<usize>>,
    rotation: usize,
}

impl ScriptedRandom {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: Mutex::new(picks.into_iter().collect()),
            rotation: 0,
        }
    }

    pub fn with_rotation(mut self, rotation: usize) -> Self {
        self.rotation = rotation;
        self
    }

    /// Scripted picks not consumed yet.
    pub fn remaining(&self) -> usize {
        lock(&self.picks).len()
    }
}

impl RandomSource for ScriptedRandom {
    fn pick_index(&self, len: usize) -> usize {
        let next = lock(&self.picks).pop_front().unwrap_or(0);
        next % len.max(1)
    }

    fn shuffle(&self, ids: &mut [UserId]) {
        if !ids.is_empty() {
            ids.rotate_left(self.rotation % ids.len());
        }
    }
}

/// Reproducible randomness from a fixed seed.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<fastrand::Rng>,
}

impl SeededRandom {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&self, len: usize) -> usize {
        lock(&self.rng).usize(..len)
    }

    fn shuffle(&self, ids: &mut [UserId]) {
        lock(&self.rng).shuffle(ids);
    }
}

// ============================================================================
// Fault injection
// ============================================================================

/// Store call that a [`FaultyStore`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Begin,
    OpenPrsReviewedBy,
    TxUpdatePrReviewers,
    TxUpdateUserActive,
    Commit,
    CreatePr,
}

/// Wraps a store and fails one chosen call with a storage error.
///
/// Every other call is delegated unchanged, so the inner store shows exactly
/// what was committed before the failure.
pub struct FaultyStore<S> {
    inner: S,
    fail_at: FailPoint,
}

impl<S: ReviewStore> FaultyStore<S> {
    pub fn new(inner: S, fail_at: FailPoint) -> Self {
        Self { inner, fail_at }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check(&self, point: FailPoint) -> Result<()> {
        check(self.fail_at, point)
    }
}

fn check(fail_at: FailPoint, point: FailPoint) -> Result<()> {
    if fail_at == point {
        return Err(AssignmentError::storage(format!("injected failure at {:?}", point)));
    }
    Ok(())
}

pub struct FaultyTransaction<T> {
    inner: T,
    fail_at: FailPoint,
}

#[async_trait]
impl<S: ReviewStore> ReviewStore for FaultyStore<S> {
    type Transaction = FaultyTransaction<S::Transaction>;

    async fn begin(&self) -> Result<Self::Transaction> {
        self.check(FailPoint::Begin)?;
        Ok(FaultyTransaction {
            inner: self.inner.begin().await?,
            fail_at: self.fail_at,
        })
    }

    async fn team_exists(&self, team_name: &TeamName) -> Result<bool> {
        self.inner.team_exists(team_name).await
    }

    async fn create_team(&self, team: &Team) -> Result<()> {
        self.inner.create_team(team).await
    }

    async fn get_team(&self, team_name: &TeamName) -> Result<Option<Team>> {
        self.inner.get_team(team_name).await
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        self.inner.get_user(user_id).await
    }

    async fn get_active_users_by_team(&self, team_name: &TeamName) -> Result<Vec<User>> {
        self.inner.get_active_users_by_team(team_name).await
    }

    async fn is_user_in_other_team(&self, user_id: &UserId, team_name: &TeamName) -> Result<bool> {
        self.inner.is_user_in_other_team(user_id, team_name).await
    }

    async fn update_user_active(&self, user_id: &UserId, is_active: bool) -> Result<()> {
        self.inner.update_user_active(user_id, is_active).await
    }

    async fn pr_exists(&self, pr_id: &PullRequestId) -> Result<bool> {
        self.inner.pr_exists(pr_id).await
    }

    async fn create_pr(&self, pr: &PullRequest) -> Result<()> {
        self.check(FailPoint::CreatePr)?;
        self.inner.create_pr(pr).await
    }

    async fn get_pr(&self, pr_id: &PullRequestId) -> Result<Option<PullRequest>> {
        self.inner.get_pr(pr_id).await
    }

    async fn update_pr_status(
        &self,
        pr_id: &PullRequestId,
        status: PullRequestStatus,
    ) -> Result<()> {
        self.inner.update_pr_status(pr_id, status).await
    }

    async fn update_pr_reviewers(
        &self,
        pr_id: &PullRequestId,
        reviewers: &[UserId],
    ) -> Result<()> {
        self.inner.update_pr_reviewers(pr_id, reviewers).await
    }

    async fn get_prs_by_reviewer(&self, user_id: &UserId) -> Result<Vec<PullRequestShort>> {
        self.inner.get_prs_by_reviewer(user_id).await
    }

    async fn assignment_stats(&self) -> Result<StatsResponse> {
        self.inner.assignment_stats().await
    }
}

#[async_trait]
impl<T: StoreTransaction> StoreTransaction for FaultyTransaction<T> {
    async fn team_exists(&mut self, team_name: &TeamName) -> Result<bool> {
        self.inner.team_exists(team_name).await
    }

    async fn get_user(&mut self, user_id: &UserId) -> Result<Option<User>> {
        self.inner.get_user(user_id).await
    }

    async fn get_active_users_by_team(&mut self, team_name: &TeamName) -> Result<Vec<User>> {
        self.inner.get_active_users_by_team(team_name).await
    }

    async fn get_pr_for_update(&mut self, pr_id: &PullRequestId) -> Result<Option<PullRequest>> {
        self.inner.get_pr_for_update(pr_id).await
    }

    async fn get_open_prs_reviewed_by(&mut self, user_ids: &[UserId]) -> Result<Vec<PullRequest>> {
        check(self.fail_at, FailPoint::OpenPrsReviewedBy)?;
        self.inner.get_open_prs_reviewed_by(user_ids).await
    }

    async fn update_pr_reviewers(
        &mut self,
        pr_id: &PullRequestId,
        reviewers: &[UserId],
    ) -> Result<()> {
        check(self.fail_at, FailPoint::TxUpdatePrReviewers)?;
        self.inner.update_pr_reviewers(pr_id, reviewers).await
    }

    async fn update_user_active(&mut self, user_id: &UserId, is_active: bool) -> Result<()> {
        check(self.fail_at, FailPoint::TxUpdateUserActive)?;
        self.inner.update_user_active(user_id, is_active).await
    }

    async fn commit(self) -> Result<()> {
        // A failed commit must not persist anything.
        if let Err(err) = check(self.fail_at, FailPoint::Commit) {
            self.inner.rollback().await?;
            return Err(err);
        }
        self.inner.commit().await
    }

    async fn rollback(self) -> Result<()> {
        self.inner.rollback().await
    }
}
