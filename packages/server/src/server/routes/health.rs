use std::time::Duration;

use assignment::{RandomSource, ReviewStore};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// Health check endpoint
///
/// Returns 200 OK when the store answers a ping within five seconds,
/// 503 Service Unavailable otherwise.
pub async fn health_handler<S, R>(
    State(state): State<AppState<S, R>>,
) -> (StatusCode, Json<HealthResponse>)
where
    S: ReviewStore + 'static,
    R: RandomSource + 'static,
{
    match tokio::time::timeout(PING_TIMEOUT, state.engine.ping()).await {
        Ok(Ok(())) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "OK",
                database: "ok",
            }),
        ),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Health check failed");
            unavailable()
        }
        Err(_) => {
            tracing::warn!("Health check timed out");
            unavailable()
        }
    }
}

fn unavailable() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse {
            status: "UNAVAILABLE",
            database: "error",
        }),
    )
}
