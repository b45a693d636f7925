//! Assignment engine.
//!
//! Orchestrates reviewer assignment on pull request creation, single reviewer
//! reassignment and the bulk deactivation cascade. The engine owns every
//! invariant on reviewer sets and draws all transaction boundaries; the store
//! only persists rows and the selector only computes candidates.

mod bulk;
mod pull_requests;
mod teams;
mod users;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::error::Result;
use crate::traits::{
    random::{RandomSource, ThreadRandom},
    store::{ReviewStore, StoreTransaction},
};
use crate::types::{
    ids::{PullRequestId, UserId},
    stats::StatsResponse,
};

/// Message used when a referenced row does not exist and the caller gets no
/// more detail than that.
pub(crate) const RESOURCE_NOT_FOUND: &str = "resource not found";

/// Input for [`AssignmentEngine::create_pr`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPullRequest {
    pub pull_request_id: PullRequestId,
    pub pull_request_name: String,
    pub author_id: UserId,
}

impl NewPullRequest {
    pub fn new(
        pull_request_id: impl Into<PullRequestId>,
        pull_request_name: impl Into<String>,
        author_id: impl Into<UserId>,
    ) -> Self {
        Self {
            pull_request_id: pull_request_id.into(),
            pull_request_name: pull_request_name.into(),
            author_id: author_id.into(),
        }
    }
}

/// Reviewer assignment engine over a store and a randomness source.
///
/// Holds no mutable state of its own; cloning is cheap and clones share the
/// same store.
pub struct AssignmentEngine<S, R = ThreadRandom> {
    store: Arc<S>,
    random: Arc<R>,
}

impl<S, R> Clone for AssignmentEngine<S, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            random: Arc::clone(&self.random),
        }
    }
}

impl<S: ReviewStore> AssignmentEngine<S> {
    /// Engine backed by the process-wide random generator.
    pub fn new(store: S) -> Self {
        Self::with_random(store, ThreadRandom)
    }
}

impl<S: ReviewStore, R: RandomSource> AssignmentEngine<S, R> {
    pub fn with_random(store: S, random: R) -> Self {
        Self {
            store: Arc::new(store),
            random: Arc::new(random),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read-only assignment statistics.
    pub async fn stats(&self) -> Result<StatsResponse> {
        self.store.assignment_stats().await
    }

    /// Whether the backing store is reachable.
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}

/// Commit on success, roll back on failure.
///
/// A failed rollback is logged and the original error is returned; dropping
/// the transaction discards its writes either way.
async fn finish<T, Tx: StoreTransaction>(tx: Tx, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(err)
        }
    }
}
