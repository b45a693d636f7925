//! Team creation and lookup. Membership is fixed when the team is created.

use std::collections::HashSet;
use tracing::{debug, info, instrument};

use super::{AssignmentEngine, RESOURCE_NOT_FOUND};
use crate::error::{AssignmentError, Result};
use crate::traits::{random::RandomSource, store::ReviewStore};
use crate::types::{ids::TeamName, team::Team};

impl<S: ReviewStore, R: RandomSource> AssignmentEngine<S, R> {
    /// Create a team together with all of its members.
    #[instrument(skip_all, fields(team_name = %team.team_name, members = team.members.len()))]
    pub async fn create_team(&self, team: Team) -> Result<Team> {
        let mut seen = HashSet::new();
        if let Some(dup) = team.members.iter().find(|m| !seen.insert(&m.user_id)) {
            return Err(AssignmentError::InvalidInput(format!(
                "duplicate user_id in members: {}",
                dup.user_id
            )));
        }

        if self.store.team_exists(&team.team_name).await? {
            debug!("Team already exists");
            return Err(AssignmentError::TeamExists);
        }

        for member in &team.members {
            if self
                .store
                .is_user_in_other_team(&member.user_id, &team.team_name)
                .await?
            {
                debug!(user_id = %member.user_id, "Member belongs to another team");
                return Err(AssignmentError::UserInOtherTeam(member.user_id.clone()));
            }
        }

        self.store.create_team(&team).await?;

        info!("Team created");
        Ok(team)
    }

    pub async fn get_team(&self, team_name: &TeamName) -> Result<Team> {
        self.store
            .get_team(team_name)
            .await?
            .ok_or_else(|| AssignmentError::not_found(RESOURCE_NOT_FOUND))
    }
}
