//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{AssignmentError, Result};
use crate::traits::store::{ReviewStore, StoreTransaction};
use crate::types::{
    ids::{PullRequestId, TeamName, UserId},
    pull_request::{PullRequest, PullRequestShort, PullRequestStatus},
    stats::{PrStat, StatsResponse, StatsSummary, UserStat},
    team::{Team, User},
};

/// In-memory storage for teams, users and pull requests.
///
/// All tables sit behind one async mutex. A transaction holds the lock for
/// its whole lifetime and works on a staged copy, so transactions are
/// serialised and commit is all-or-nothing. Cloning the store shares the
/// underlying tables.
///
/// Not suitable for production as data is lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    teams: BTreeSet<TeamName>,
    users: BTreeMap<UserId, User>,
    pull_requests: BTreeMap<PullRequestId, PullRequest>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored users.
    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    /// Get the number of stored pull requests.
    pub async fn pr_count(&self) -> usize {
        self.tables.lock().await.pull_requests.len()
    }

    /// Every pull request, ordered by id.
    pub async fn all_prs(&self) -> Vec<PullRequest> {
        self.tables.lock().await.pull_requests.values().cloned().collect()
    }

    /// Every user, ordered by id.
    pub async fn all_users(&self) -> Vec<User> {
        self.tables.lock().await.users.values().cloned().collect()
    }
}

impl Tables {
    fn active_users(&self, team_name: &TeamName) -> Vec<User> {
        self.users
            .values()
            .filter(|u| u.is_active && &u.team_name == team_name)
            .cloned()
            .collect()
    }

    fn set_user_active(&mut self, user_id: &UserId, is_active: bool) {
        if let Some(user) = self.users.get_mut(user_id) {
            user.is_active = is_active;
        }
    }

    fn set_reviewers(&mut self, pr_id: &PullRequestId, reviewers: &[UserId]) {
        if let Some(pr) = self.pull_requests.get_mut(pr_id) {
            pr.assigned_reviewers = reviewers.to_vec();
        }
    }

    fn open_prs_reviewed_by(&self, user_ids: &[UserId]) -> Vec<PullRequest> {
        let wanted: HashSet<&UserId> = user_ids.iter().collect();
        self.pull_requests
            .values()
            .filter(|pr| pr.status == PullRequestStatus::Open)
            .filter(|pr| pr.assigned_reviewers.iter().any(|r| wanted.contains(r)))
            .cloned()
            .collect()
    }

    fn stats(&self) -> StatsResponse {
        let mut open_load: HashMap<&UserId, i64> = HashMap::new();
        let mut total_load: HashMap<&UserId, i64> = HashMap::new();
        for pr in self.pull_requests.values() {
            for reviewer in &pr.assigned_reviewers {
                *total_load.entry(reviewer).or_default() += 1;
                if pr.status == PullRequestStatus::Open {
                    *open_load.entry(reviewer).or_default() += 1;
                }
            }
        }

        let mut user_stats: Vec<UserStat> = self
            .users
            .values()
            .map(|u| UserStat {
                user_id: u.user_id.clone(),
                username: u.username.clone(),
                team_name: u.team_name.clone(),
                is_active: u.is_active,
                assignments_count: open_load.get(&u.user_id).copied().unwrap_or(0),
            })
            .collect();
        user_stats.sort_by(|a, b| {
            b.assignments_count
                .cmp(&a.assignments_count)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        let mut pr_stats: Vec<PrStat> = self
            .pull_requests
            .values()
            .map(|pr| PrStat {
                pull_request_id: pr.pull_request_id.clone(),
                pull_request_name: pr.pull_request_name.clone(),
                author_id: pr.author_id.clone(),
                status: pr.status,
                reviewers_count: pr.assigned_reviewers.len() as i64,
                team_name: self
                    .users
                    .get(&pr.author_id)
                    .map(|u| u.team_name.clone())
                    .unwrap_or_default(),
            })
            .collect();
        pr_stats.sort_by(|a, b| {
            b.reviewers_count
                .cmp(&a.reviewers_count)
                .then_with(|| a.pull_request_id.cmp(&b.pull_request_id))
        });

        let total_prs = self.pull_requests.len() as i64;
        let total_assignments: i64 = total_load.values().sum();
        let most_active_user = total_load
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(id, _)| (*id).clone());
        let most_reviewed_pr = pr_stats
            .first()
            .filter(|p| p.reviewers_count > 0)
            .map(|p| p.pull_request_id.clone());

        StatsResponse {
            user_stats,
            pr_stats,
            summary: StatsSummary {
                total_users: self.users.len() as i64,
                total_prs,
                total_assignments,
                avg_reviewers_per_pr: StatsSummary::average(total_assignments, total_prs),
                most_active_user,
                most_reviewed_pr,
            },
        }
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Transaction> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTransaction { guard, staged })
    }

    async fn team_exists(&self, team_name: &TeamName) -> Result<bool> {
        Ok(self.tables.lock().await.teams.contains(team_name))
    }

    async fn create_team(&self, team: &Team) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if tables.teams.contains(&team.team_name) {
            return Err(AssignmentError::TeamExists);
        }
        if let Some(taken) = team
            .members
            .iter()
            .find(|m| tables.users.contains_key(&m.user_id))
        {
            return Err(AssignmentError::UserInOtherTeam(taken.user_id.clone()));
        }

        tables.teams.insert(team.team_name.clone());
        for user in team.users() {
            tables.users.insert(user.user_id.clone(), user);
        }
        Ok(())
    }

    async fn get_team(&self, team_name: &TeamName) -> Result<Option<Team>> {
        let tables = self.tables.lock().await;
        if !tables.teams.contains(team_name) {
            return Ok(None);
        }
        let members = tables
            .users
            .values()
            .filter(|u| &u.team_name == team_name)
            .map(User::as_member)
            .collect();
        Ok(Some(Team::new(team_name.clone(), members)))
    }

    async fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(user_id).cloned())
    }

    async fn get_active_users_by_team(&self, team_name: &TeamName) -> Result<Vec<User>> {
        Ok(self.tables.lock().await.active_users(team_name))
    }

    async fn is_user_in_other_team(&self, user_id: &UserId, team_name: &TeamName) -> Result<bool> {
        Ok(self
            .tables
            .lock()
            .await
            .users
            .get(user_id)
            .is_some_and(|u| &u.team_name != team_name))
    }

    async fn update_user_active(&self, user_id: &UserId, is_active: bool) -> Result<()> {
        self.tables.lock().await.set_user_active(user_id, is_active);
        Ok(())
    }

    async fn pr_exists(&self, pr_id: &PullRequestId) -> Result<bool> {
        Ok(self.tables.lock().await.pull_requests.contains_key(pr_id))
    }

    async fn create_pr(&self, pr: &PullRequest) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if tables.pull_requests.contains_key(&pr.pull_request_id) {
            return Err(AssignmentError::PrExists);
        }
        let mut stored = pr.clone();
        stored.created_at.get_or_insert_with(Utc::now);
        tables.pull_requests.insert(stored.pull_request_id.clone(), stored);
        Ok(())
    }

    async fn get_pr(&self, pr_id: &PullRequestId) -> Result<Option<PullRequest>> {
        Ok(self.tables.lock().await.pull_requests.get(pr_id).cloned())
    }

    async fn update_pr_status(
        &self,
        pr_id: &PullRequestId,
        status: PullRequestStatus,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(pr) = tables.pull_requests.get_mut(pr_id) {
            pr.status = status;
            if status.is_merged() {
                pr.merged_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn update_pr_reviewers(
        &self,
        pr_id: &PullRequestId,
        reviewers: &[UserId],
    ) -> Result<()> {
        self.tables.lock().await.set_reviewers(pr_id, reviewers);
        Ok(())
    }

    async fn get_prs_by_reviewer(&self, user_id: &UserId) -> Result<Vec<PullRequestShort>> {
        let tables = self.tables.lock().await;
        let mut prs: Vec<&PullRequest> = tables
            .pull_requests
            .values()
            .filter(|pr| pr.is_reviewed_by(user_id))
            .collect();
        prs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.pull_request_id.cmp(&b.pull_request_id))
        });
        Ok(prs.into_iter().map(PullRequest::short).collect())
    }

    async fn assignment_stats(&self) -> Result<StatsResponse> {
        Ok(self.tables.lock().await.stats())
    }
}

/// Transaction over a [`MemoryStore`].
///
/// Holds the store lock until it is committed, rolled back or dropped.
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn team_exists(&mut self, team_name: &TeamName) -> Result<bool> {
        Ok(self.staged.teams.contains(team_name))
    }

    async fn get_user(&mut self, user_id: &UserId) -> Result<Option<User>> {
        Ok(self.staged.users.get(user_id).cloned())
    }

    async fn get_active_users_by_team(&mut self, team_name: &TeamName) -> Result<Vec<User>> {
        Ok(self.staged.active_users(team_name))
    }

    async fn get_pr_for_update(&mut self, pr_id: &PullRequestId) -> Result<Option<PullRequest>> {
        Ok(self.staged.pull_requests.get(pr_id).cloned())
    }

    async fn get_open_prs_reviewed_by(&mut self, user_ids: &[UserId]) -> Result<Vec<PullRequest>> {
        Ok(self.staged.open_prs_reviewed_by(user_ids))
    }

    async fn update_pr_reviewers(
        &mut self,
        pr_id: &PullRequestId,
        reviewers: &[UserId],
    ) -> Result<()> {
        self.staged.set_reviewers(pr_id, reviewers);
        Ok(())
    }

    async fn update_user_active(&mut self, user_id: &UserId, is_active: bool) -> Result<()> {
        self.staged.set_user_active(user_id, is_active);
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        let MemoryTransaction { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}
