//! Test fixtures: an in-process app and request helpers.
//!
//! Requests go straight into the router with `oneshot`; no socket is opened.

use std::time::Duration;

use assignment::testing::ScriptedRandom;
use assignment::{AssignmentEngine, MemoryStore};
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use review_server::server::build_app;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Router over an in-memory store with deterministic reviewer choice:
/// candidates keep member order and the first one is always picked.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_random(ScriptedRandom::default())
    }

    pub fn with_random(random: ScriptedRandom) -> Self {
        let store = MemoryStore::new();
        let engine = AssignmentEngine::with_random(store.clone(), random);
        Self {
            router: build_app(engine, Duration::from_secs(5)),
            store,
        }
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send_raw(Method::POST, path, Body::from(body.to_string()))
            .await
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send_raw(Method::GET, path, Body::empty()).await
    }

    pub async fn send_raw(&self, method: Method, path: &str, body: Body) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, value)
    }

    /// Create team `name` with active members `ids` (usernames are upper-cased ids).
    pub async fn add_team(&self, name: &str, ids: &[&str]) {
        let members: Vec<Value> = ids
            .iter()
            .map(|id| json!({"user_id": id, "username": id.to_uppercase(), "is_active": true}))
            .collect();
        let (status, body) = self
            .post("/team/add", json!({"team_name": name, "members": members}))
            .await;
        assert_eq!(status, StatusCode::CREATED, "team setup failed: {}", body);
    }

    pub async fn create_pr(&self, pr_id: &str, author_id: &str) -> (StatusCode, Value) {
        self.post(
            "/pullRequest/create",
            json!({
                "pull_request_id": pr_id,
                "pull_request_name": format!("Change {}", pr_id),
                "author_id": author_id,
            }),
        )
        .await
    }
}

/// Reviewer ids of a `pr` object.
pub fn reviewers(pr: &Value) -> Vec<String> {
    pr["assigned_reviewers"]
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// `error.code` of an error response.
pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
