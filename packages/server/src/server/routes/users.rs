use assignment::{
    BulkDeactivateResponse, RandomSource, ReviewStore, TeamName, User, UserId, UserPullRequests,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;
use crate::server::error::{require, ApiError};

#[derive(Debug, Deserialize)]
pub struct SetIsActiveRequest {
    pub user_id: UserId,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeactivateRequest {
    pub team_name: TeamName,
    pub user_ids: Vec<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub user_id: UserId,
}

/// `POST /users/setIsActive`
pub async fn set_is_active<S, R>(
    State(state): State<AppState<S, R>>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError>
where
    S: ReviewStore + 'static,
    R: RandomSource + 'static,
{
    let Json(req) = payload?;
    require("user_id", &req.user_id)?;

    let user = state
        .engine
        .set_user_active(&req.user_id, req.is_active)
        .await?;
    Ok(Json(UserResponse { user }))
}

/// `POST /users/bulkDeactivate`
pub async fn bulk_deactivate<S, R>(
    State(state): State<AppState<S, R>>,
    payload: Result<Json<BulkDeactivateRequest>, JsonRejection>,
) -> Result<Json<BulkDeactivateResponse>, ApiError>
where
    S: ReviewStore + 'static,
    R: RandomSource + 'static,
{
    let Json(req) = payload?;
    require("team_name", &req.team_name)?;
    for user_id in &req.user_ids {
        require("user_id", user_id)?;
    }

    let report = state
        .engine
        .bulk_deactivate(&req.team_name, &req.user_ids)
        .await?;
    Ok(Json(report))
}

/// `GET /users/getReview?user_id=`
pub async fn get_review<S, R>(
    State(state): State<AppState<S, R>>,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<Json<UserPullRequests>, ApiError>
where
    S: ReviewStore + 'static,
    R: RandomSource + 'static,
{
    let Query(query) = query?;
    require("user_id", &query.user_id)?;

    let reviews = state.engine.get_user_reviews(&query.user_id).await?;
    Ok(Json(reviews))
}
