use assignment::{RandomSource, ReviewStore, Team, TeamName};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;
use crate::server::error::{require, ApiError};

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: Team,
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team_name: TeamName,
}

/// `POST /team/add`
pub async fn add_team<S, R>(
    State(state): State<AppState<S, R>>,
    payload: Result<Json<Team>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError>
where
    S: ReviewStore + 'static,
    R: RandomSource + 'static,
{
    let Json(team) = payload?;
    require("team_name", &team.team_name)?;
    for member in &team.members {
        require("user_id", &member.user_id)?;
    }

    let team = state.engine.create_team(team).await?;
    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// `GET /team/get?team_name=`
pub async fn get_team<S, R>(
    State(state): State<AppState<S, R>>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<Team>, ApiError>
where
    S: ReviewStore + 'static,
    R: RandomSource + 'static,
{
    let Query(query) = query?;
    require("team_name", &query.team_name)?;

    let team = state.engine.get_team(&query.team_name).await?;
    Ok(Json(team))
}
