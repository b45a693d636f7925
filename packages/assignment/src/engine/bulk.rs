//! Bulk deactivation cascade.
//!
//! Deactivating several team members at once repairs every open pull request
//! they review inside one transaction:
//!
//! 1. Check the team exists and every requested user is an active member.
//! 2. Load the open pull requests reviewed by any requested user.
//! 3. Per pull request, build a candidate pool from the active members minus
//!    the author, the current reviewers and every user being deactivated.
//! 4. Walk the requested users in request order. Each one that reviews the
//!    pull request takes the front of the pool in its slot, or loses the slot
//!    when the pool is empty.
//! 5. Write changed reviewer sets, deactivate the users, commit.
//!
//! Any failure rolls the whole operation back.

use std::collections::{HashSet, VecDeque};
use tracing::{debug, error, info, instrument};

use super::{finish, AssignmentEngine};
use crate::error::{AssignmentError, ErrorKind, Result};
use crate::report::{BulkDeactivateResponse, BulkReport, PrRepair, SlotOutcome};
use crate::selector::{eligible_ids, replace_slot, Exclusions};
use crate::traits::{
    random::RandomSource,
    store::{ReviewStore, StoreTransaction},
};
use crate::types::{
    ids::{TeamName, UserId},
    pull_request::PullRequest,
};

impl<S: ReviewStore, R: RandomSource> AssignmentEngine<S, R> {
    /// Deactivate `user_ids` in `team_name` and repair the reviews they held.
    ///
    /// Repeated ids are collapsed, keeping the first occurrence. Either every
    /// user is deactivated and every affected pull request repaired, or
    /// nothing changes.
    #[instrument(skip_all, fields(team_name = %team_name, requested = user_ids.len()))]
    pub async fn bulk_deactivate(
        &self,
        team_name: &TeamName,
        user_ids: &[UserId],
    ) -> Result<BulkDeactivateResponse> {
        let user_ids = dedup_preserving_order(user_ids);

        let mut tx = self.store.begin().await?;
        let outcome = deactivate_in_tx(&mut tx, team_name, &user_ids).await;

        match finish(tx, outcome).await {
            Ok(response) => {
                info!(
                    deactivated = response.deactivated_users.len(),
                    reassigned = response.replacement_count(),
                    failed = response.failed_reassignments.len(),
                    "Bulk deactivation committed"
                );
                Ok(response)
            }
            Err(err) if err.kind() == ErrorKind::Internal => {
                error!(error = %err, "Bulk deactivation rolled back");
                Err(err)
            }
            Err(err) => {
                debug!(code = err.code(), error = %err, "Bulk deactivation rejected");
                Err(err)
            }
        }
    }
}

async fn deactivate_in_tx<Tx: StoreTransaction>(
    tx: &mut Tx,
    team_name: &TeamName,
    user_ids: &[UserId],
) -> Result<BulkDeactivateResponse> {
    if !tx.team_exists(team_name).await? {
        return Err(AssignmentError::not_found("team not found"));
    }

    let active_ids: Vec<UserId> = tx
        .get_active_users_by_team(team_name)
        .await?
        .into_iter()
        .map(|u| u.user_id)
        .collect();

    if let Some(missing) = user_ids.iter().find(|id| !active_ids.contains(id)) {
        return Err(AssignmentError::not_found(format!(
            "user not found or not active: {}",
            missing
        )));
    }

    let mut report = BulkReport::new(team_name.clone(), user_ids.to_vec());
    if user_ids.is_empty() {
        return Ok(report.finish());
    }

    let prs = tx.get_open_prs_reviewed_by(user_ids).await?;
    for pr in &prs {
        let repair = plan_repair(pr, &active_ids, user_ids);
        if repair.is_empty() {
            continue;
        }
        tx.update_pr_reviewers(&pr.pull_request_id, &repair.reviewers)
            .await?;
        debug!(
            pr_id = %pr.pull_request_id,
            reviewers = ?repair.reviewers,
            "Reviewer slots repaired"
        );
        report.record(&repair);
    }

    for user_id in user_ids {
        tx.update_user_active(user_id, false).await?;
    }

    Ok(report.finish())
}

/// Decide how one pull request's reviewer slots change.
///
/// The pool is private to this pull request: a candidate is used at most once
/// here but may fill slots on other pull requests in the same call.
pub(crate) fn plan_repair(
    pr: &PullRequest,
    active_ids: &[UserId],
    deactivating: &[UserId],
) -> PrRepair {
    let excluded = Exclusions::new()
        .with(&pr.author_id)
        .with_all(&pr.assigned_reviewers)
        .with_all(deactivating);
    let mut pool: VecDeque<UserId> = eligible_ids(active_ids, &excluded).into();

    let mut reviewers = pr.assigned_reviewers.clone();
    let mut outcomes = Vec::new();

    for old in deactivating {
        if !reviewers.contains(old) {
            continue;
        }
        match pool.pop_front() {
            Some(new) => {
                reviewers = replace_slot(&reviewers, old, &new);
                outcomes.push(SlotOutcome::Replaced {
                    old: old.clone(),
                    new,
                });
            }
            None => {
                reviewers.retain(|r| r != old);
                outcomes.push(SlotOutcome::Vacated { old: old.clone() });
            }
        }
    }

    PrRepair {
        pull_request_id: pr.pull_request_id.clone(),
        reviewers,
        outcomes,
    }
}

fn dedup_preserving_order(user_ids: &[UserId]) -> Vec<UserId> {
    let mut seen = HashSet::new();
    user_ids
        .iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<UserId> {
        values.iter().map(|v| UserId::from(*v)).collect()
    }

    fn open_pr(id: &str, author: &str, reviewers: &[&str]) -> PullRequest {
        PullRequest::open(id.into(), id.to_string(), author.into(), ids(reviewers))
    }

    #[test]
    fn test_replacement_keeps_slot_position() {
        let pr = open_pr("pr-1", "u1", &["u2", "u3"]);
        let repair = plan_repair(&pr, &ids(&["u1", "u2", "u3", "u4"]), &ids(&["u2"]));

        assert_eq!(repair.reviewers, ids(&["u4", "u3"]));
        assert_eq!(
            repair.outcomes,
            vec![SlotOutcome::Replaced {
                old: "u2".into(),
                new: "u4".into()
            }]
        );
    }

    #[test]
    fn test_two_slots_take_distinct_candidates() {
        let pr = open_pr("pr-1", "u1", &["u2", "u3"]);
        let repair = plan_repair(
            &pr,
            &ids(&["u1", "u2", "u3", "u4", "u5"]),
            &ids(&["u3", "u2"]),
        );

        // Request order decides who takes the front of the pool.
        assert_eq!(repair.reviewers, ids(&["u5", "u4"]));
    }

    #[test]
    fn test_empty_pool_vacates_slot() {
        let pr = open_pr("pr-1", "u1", &["u2", "u3"]);
        let repair = plan_repair(&pr, &ids(&["u1", "u2", "u3", "u4"]), &ids(&["u2", "u3"]));

        assert_eq!(repair.reviewers, ids(&["u4"]));
        assert_eq!(
            repair.outcomes[1],
            SlotOutcome::Vacated { old: "u3".into() }
        );
    }

    #[test]
    fn test_deactivating_users_are_never_offered() {
        let pr = open_pr("pr-1", "u1", &["u2"]);
        let repair = plan_repair(&pr, &ids(&["u1", "u2", "u3"]), &ids(&["u2", "u3"]));

        assert!(repair.reviewers.is_empty());
        assert_eq!(repair.outcomes, vec![SlotOutcome::Vacated { old: "u2".into() }]);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        assert_eq!(
            dedup_preserving_order(&ids(&["u3", "u2", "u3"])),
            ids(&["u3", "u2"])
        );
    }
}
