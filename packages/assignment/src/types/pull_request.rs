use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{PullRequestId, UserId};

/// Lifecycle of a pull request. Transitions only go `Open -> Merged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

impl PullRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged)
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PullRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            other => Err(format!("unknown pull request status: {}", other)),
        }
    }
}

/// A pull request with its reviewer slots.
///
/// `assigned_reviewers` holds at most two users, never the author, never
/// duplicated. Its order is the slot order and is stable across reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pull_request_id: PullRequestId,
    pub pull_request_name: String,
    pub author_id: UserId,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<UserId>,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "mergedAt", default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// A freshly opened pull request.
    pub fn open(
        pull_request_id: PullRequestId,
        pull_request_name: String,
        author_id: UserId,
        assigned_reviewers: Vec<UserId>,
    ) -> Self {
        Self {
            pull_request_id,
            pull_request_name,
            author_id,
            status: PullRequestStatus::Open,
            assigned_reviewers,
            created_at: Some(Utc::now()),
            merged_at: None,
        }
    }

    pub fn is_reviewed_by(&self, user_id: &UserId) -> bool {
        self.assigned_reviewers.contains(user_id)
    }

    pub fn short(&self) -> PullRequestShort {
        PullRequestShort {
            pull_request_id: self.pull_request_id.clone(),
            pull_request_name: self.pull_request_name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// Listing form used by the "reviews of a user" query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    pub pull_request_id: PullRequestId,
    pub pull_request_name: String,
    pub author_id: UserId,
    pub status: PullRequestStatus,
}
