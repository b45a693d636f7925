//! Application setup and router construction.

use std::time::Duration;

use assignment::{AssignmentEngine, RandomSource, ReviewStore, ThreadRandom};
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::server::routes::{health, pull_requests, stats, team, users};

/// Shared application state
pub struct AppState<S, R = ThreadRandom> {
    pub engine: AssignmentEngine<S, R>,
}

impl<S, R> Clone for AppState<S, R> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

/// Build the Axum application router
///
/// Requests that run past `request_timeout` are answered with 408; the
/// handler future is dropped, which rolls back any open transaction.
pub fn build_app<S, R>(engine: AssignmentEngine<S, R>, request_timeout: Duration) -> Router
where
    S: ReviewStore + 'static,
    R: RandomSource + 'static,
{
    let state = AppState { engine };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/team/add", post(team::add_team::<S, R>))
        .route("/team/get", get(team::get_team::<S, R>))
        .route("/users/setIsActive", post(users::set_is_active::<S, R>))
        .route("/users/bulkDeactivate", post(users::bulk_deactivate::<S, R>))
        .route("/users/getReview", get(users::get_review::<S, R>))
        .route("/pullRequest/create", post(pull_requests::create::<S, R>))
        .route("/pullRequest/merge", post(pull_requests::merge::<S, R>))
        .route("/pullRequest/reassign", post(pull_requests::reassign::<S, R>))
        .route("/stats", get(stats::stats_handler::<S, R>))
        .route("/health", get(health::health_handler::<S, R>))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
