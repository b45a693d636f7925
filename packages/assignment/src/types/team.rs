use serde::{Deserialize, Serialize};

use super::ids::{TeamName, UserId};

/// A user belongs to exactly one team, fixed when the team is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub team_name: TeamName,
    pub is_active: bool,
}

/// A user as listed inside its team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: UserId,
    pub username: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: TeamName,
    pub members: Vec<TeamMember>,
}

impl User {
    pub fn new(
        user_id: impl Into<UserId>,
        username: impl Into<String>,
        team_name: impl Into<TeamName>,
        is_active: bool,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            team_name: team_name.into(),
            is_active,
        }
    }

    pub fn as_member(&self) -> TeamMember {
        TeamMember {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            is_active: self.is_active,
        }
    }
}

impl TeamMember {
    pub fn new(user_id: impl Into<UserId>, username: impl Into<String>, is_active: bool) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active,
        }
    }
}

impl Team {
    pub fn new(team_name: impl Into<TeamName>, members: Vec<TeamMember>) -> Self {
        Self {
            team_name: team_name.into(),
            members,
        }
    }

    /// Expand members into user records owned by this team.
    pub fn users(&self) -> Vec<User> {
        self.members
            .iter()
            .map(|m| User {
                user_id: m.user_id.clone(),
                username: m.username.clone(),
                team_name: self.team_name.clone(),
                is_active: m.is_active,
            })
            .collect()
    }
}
