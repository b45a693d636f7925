//! Result shapes returned to callers.
//!
//! The engine records what happened to every reviewer slot it touched as a
//! [`SlotOutcome`]; [`BulkReport`] folds those outcomes into the
//! [`BulkDeactivateResponse`] payload.

use serde::{Deserialize, Serialize};

use crate::types::{
    ids::{PullRequestId, TeamName, UserId},
    pull_request::{PullRequest, PullRequestShort},
};

/// Reason recorded when a deactivated reviewer's slot could not be refilled.
pub const NO_REPLACEMENT_REASON: &str = "no active replacement candidate available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReassignResponse {
    pub pr: PullRequest,
    pub replaced_by: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPullRequests {
    pub user_id: UserId,
    pub pull_requests: Vec<PullRequestShort>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReplacement {
    pub old_user_id: UserId,
    pub new_user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignedPrDetail {
    pub pull_request_id: PullRequestId,
    pub replacements: Vec<UserReplacement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedReassignment {
    pub pull_request_id: PullRequestId,
    pub old_user_id: UserId,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeactivateResponse {
    pub team_name: TeamName,
    pub deactivated_users: Vec<UserId>,
    pub reassigned_prs: Vec<ReassignedPrDetail>,
    pub failed_reassignments: Vec<FailedReassignment>,
}

impl BulkDeactivateResponse {
    pub fn replacement_count(&self) -> usize {
        self.reassigned_prs.iter().map(|p| p.replacements.len()).sum()
    }
}

/// What happened to one reviewer slot during a cascade repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    Replaced { old: UserId, new: UserId },
    Vacated { old: UserId },
}

/// Repair plan for one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrRepair {
    pub pull_request_id: PullRequestId,
    /// Reviewer set after the repair, in slot order.
    pub reviewers: Vec<UserId>,
    pub outcomes: Vec<SlotOutcome>,
}

impl PrRepair {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Accumulates per-PR repairs into the bulk deactivation response.
#[derive(Debug)]
pub struct BulkReport {
    response: BulkDeactivateResponse,
}

impl BulkReport {
    pub fn new(team_name: TeamName, deactivated_users: Vec<UserId>) -> Self {
        Self {
            response: BulkDeactivateResponse {
                team_name,
                deactivated_users,
                reassigned_prs: Vec::new(),
                failed_reassignments: Vec::new(),
            },
        }
    }

    /// Record one repaired PR. Repairs that touched no slot are not listed.
    pub fn record(&mut self, repair: &PrRepair) {
        if repair.is_empty() {
            return;
        }

        let mut detail = ReassignedPrDetail {
            pull_request_id: repair.pull_request_id.clone(),
            replacements: Vec::new(),
        };

        for outcome in &repair.outcomes {
            match outcome {
                SlotOutcome::Replaced { old, new } => detail.replacements.push(UserReplacement {
                    old_user_id: old.clone(),
                    new_user_id: new.clone(),
                }),
                SlotOutcome::Vacated { old } => {
                    self.response.failed_reassignments.push(FailedReassignment {
                        pull_request_id: repair.pull_request_id.clone(),
                        old_user_id: old.clone(),
                        reason: NO_REPLACEMENT_REASON.to_string(),
                    })
                }
            }
        }

        self.response.reassigned_prs.push(detail);
    }

    pub fn finish(self) -> BulkDeactivateResponse {
        self.response
    }
}
