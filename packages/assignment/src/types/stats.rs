//! Read-only assignment statistics.

use serde::{Deserialize, Serialize};

use super::ids::{PullRequestId, TeamName, UserId};
use super::pull_request::PullRequestStatus;

/// Review load of one user. `assignments_count` counts open pull requests only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct UserStat {
    pub user_id: UserId,
    pub username: String,
    pub team_name: TeamName,
    pub is_active: bool,
    pub assignments_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrStat {
    pub pull_request_id: PullRequestId,
    pub pull_request_name: String,
    pub author_id: UserId,
    pub status: PullRequestStatus,
    pub reviewers_count: i64,
    pub team_name: TeamName,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_users: i64,
    pub total_prs: i64,
    pub total_assignments: i64,
    pub avg_reviewers_per_pr: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_active_user: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_reviewed_pr: Option<PullRequestId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub user_stats: Vec<UserStat>,
    pub pr_stats: Vec<PrStat>,
    pub summary: StatsSummary,
}

impl StatsSummary {
    /// Average is zero when there are no pull requests.
    pub fn average(total_assignments: i64, total_prs: i64) -> f64 {
        if total_prs > 0 {
            total_assignments as f64 / total_prs as f64
        } else {
            0.0
        }
    }
}
