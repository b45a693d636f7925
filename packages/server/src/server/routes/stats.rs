use assignment::{RandomSource, ReviewStore, StatsResponse};
use axum::{extract::State, Json};

use crate::server::app::AppState;
use crate::server::error::ApiError;

/// `GET /stats`
pub async fn stats_handler<S, R>(
    State(state): State<AppState<S, R>>,
) -> Result<Json<StatsResponse>, ApiError>
where
    S: ReviewStore + 'static,
    R: RandomSource + 'static,
{
    let stats = state.engine.stats().await?;
    Ok(Json(stats))
}
