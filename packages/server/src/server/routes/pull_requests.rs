use assignment::{
    NewPullRequest, PullRequest, PullRequestId, RandomSource, ReassignResponse, ReviewStore,
    UserId,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;
use crate::server::error::{require, ApiError};

#[derive(Debug, Serialize)]
pub struct PrResponse {
    pub pr: PullRequest,
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub pull_request_id: PullRequestId,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    pub pull_request_id: PullRequestId,
    pub old_user_id: UserId,
}

/// `POST /pullRequest/create`
pub async fn create<S, R>(
    State(state): State<AppState<S, R>>,
    payload: Result<Json<NewPullRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PrResponse>), ApiError>
where
    S: ReviewStore + 'static,
    R: RandomSource + 'static,
{
    let Json(new_pr) = payload?;
    require("pull_request_id", &new_pr.pull_request_id)?;
    require("author_id", &new_pr.author_id)?;

    let pr = state.engine.create_pr(new_pr).await?;
    Ok((StatusCode::CREATED, Json(PrResponse { pr })))
}

/// `POST /pullRequest/merge`
pub async fn merge<S, R>(
    State(state): State<AppState<S, R>>,
    payload: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<Json<PrResponse>, ApiError>
where
    S: ReviewStore + 'static,
    R: RandomSource + 'static,
{
    let Json(req) = payload?;
    require("pull_request_id", &req.pull_request_id)?;

    let pr = state.engine.merge_pr(&req.pull_request_id).await?;
    Ok(Json(PrResponse { pr }))
}

/// `POST /pullRequest/reassign`
pub async fn reassign<S, R>(
    State(state): State<AppState<S, R>>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<ReassignResponse>, ApiError>
where
    S: ReviewStore + 'static,
    R: RandomSource + 'static,
{
    let Json(req) = payload?;
    require("pull_request_id", &req.pull_request_id)?;
    require("old_user_id", &req.old_user_id)?;

    let response = state
        .engine
        .reassign_reviewer(&req.pull_request_id, &req.old_user_id)
        .await?;
    Ok(Json(response))
}
