//! Pull request creation, merge and single reviewer reassignment.

use tracing::{debug, info, instrument};

use super::{finish, AssignmentEngine, NewPullRequest, RESOURCE_NOT_FOUND};
use crate::error::{AssignmentError, Result};
use crate::report::ReassignResponse;
use crate::selector::{
    choose_initial_reviewers, choose_replacement, eligible_candidates, replace_slot, Exclusions,
};
use crate::traits::{
    random::RandomSource,
    store::{ReviewStore, StoreTransaction},
};
use crate::types::{
    ids::{PullRequestId, UserId},
    pull_request::{PullRequest, PullRequestStatus},
};

impl<S: ReviewStore, R: RandomSource> AssignmentEngine<S, R> {
    /// Open a pull request and assign up to two reviewers from the author's
    /// team.
    ///
    /// Fails with `PrExists` if the id is taken and `NotFound` if the author
    /// does not exist. Nothing is written unless both checks pass.
    #[instrument(skip_all, fields(pr_id = %new_pr.pull_request_id, author_id = %new_pr.author_id))]
    pub async fn create_pr(&self, new_pr: NewPullRequest) -> Result<PullRequest> {
        if self.store.pr_exists(&new_pr.pull_request_id).await? {
            debug!("Pull request id already taken");
            return Err(AssignmentError::PrExists);
        }

        let Some(author) = self.store.get_user(&new_pr.author_id).await? else {
            debug!("Author not found");
            return Err(AssignmentError::not_found(RESOURCE_NOT_FOUND));
        };

        let team = self.store.get_active_users_by_team(&author.team_name).await?;
        let candidates = eligible_candidates(&team, &Exclusions::new().with(&author.user_id));
        let reviewers = choose_initial_reviewers(candidates, &*self.random);

        let pr = PullRequest::open(
            new_pr.pull_request_id,
            new_pr.pull_request_name,
            new_pr.author_id,
            reviewers,
        );
        self.store.create_pr(&pr).await?;

        info!(reviewers = ?pr.assigned_reviewers, "Pull request created");
        Ok(pr)
    }

    /// Mark a pull request merged. Merging an already merged pull request
    /// returns it unchanged.
    #[instrument(skip_all, fields(pr_id = %pr_id))]
    pub async fn merge_pr(&self, pr_id: &PullRequestId) -> Result<PullRequest> {
        let Some(pr) = self.store.get_pr(pr_id).await? else {
            return Err(AssignmentError::not_found(RESOURCE_NOT_FOUND));
        };

        if pr.status.is_merged() {
            debug!("Pull request already merged");
            return Ok(pr);
        }

        self.store
            .update_pr_status(pr_id, PullRequestStatus::Merged)
            .await?;

        let merged = self
            .store
            .get_pr(pr_id)
            .await?
            .ok_or_else(|| AssignmentError::not_found(RESOURCE_NOT_FOUND))?;

        info!("Pull request merged");
        Ok(merged)
    }

    /// Replace one reviewer with a random active member of their team.
    ///
    /// The read, the decision and the write happen in one transaction with the
    /// pull request locked, so concurrent reassignments of the same pull
    /// request are serialised.
    #[instrument(skip_all, fields(pr_id = %pr_id, old_user_id = %old_user_id))]
    pub async fn reassign_reviewer(
        &self,
        pr_id: &PullRequestId,
        old_user_id: &UserId,
    ) -> Result<ReassignResponse> {
        let mut tx = self.store.begin().await?;
        let outcome = self.reassign_in_tx(&mut tx, pr_id, old_user_id).await;

        match finish(tx, outcome).await {
            Ok(response) => {
                info!(replaced_by = %response.replaced_by, "Reviewer reassigned");
                Ok(response)
            }
            Err(err) => {
                debug!(code = err.code(), error = %err, "Reassignment rejected");
                Err(err)
            }
        }
    }

    async fn reassign_in_tx(
        &self,
        tx: &mut S::Transaction,
        pr_id: &PullRequestId,
        old_user_id: &UserId,
    ) -> Result<ReassignResponse> {
        // Lock order matches bulk deactivation: team users first, then the
        // pull request.
        let old_reviewer = tx.get_user(old_user_id).await?;
        let team = match &old_reviewer {
            Some(user) => tx.get_active_users_by_team(&user.team_name).await?,
            None => Vec::new(),
        };

        let pr = tx
            .get_pr_for_update(pr_id)
            .await?
            .ok_or_else(|| AssignmentError::not_found(RESOURCE_NOT_FOUND))?;

        if pr.status.is_merged() {
            return Err(AssignmentError::PrMerged);
        }
        if !pr.is_reviewed_by(old_user_id) {
            return Err(AssignmentError::NotAssigned);
        }
        if old_reviewer.is_none() {
            return Err(AssignmentError::not_found("old reviewer not found"));
        }

        let excluded = Exclusions::new()
            .with(old_user_id)
            .with(&pr.author_id)
            .with_all(&pr.assigned_reviewers);
        let candidates = eligible_candidates(&team, &excluded);

        let replaced_by =
            choose_replacement(&candidates, &*self.random).ok_or(AssignmentError::NoCandidate)?;

        let reviewers = replace_slot(&pr.assigned_reviewers, old_user_id, &replaced_by);
        tx.update_pr_reviewers(pr_id, &reviewers).await?;

        let pr = tx
            .get_pr_for_update(pr_id)
            .await?
            .ok_or_else(|| AssignmentError::not_found(RESOURCE_NOT_FOUND))?;

        Ok(ReassignResponse { pr, replaced_by })
    }
}
