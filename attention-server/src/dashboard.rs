//! Read-only HTTP surface over the attention store.
//!
//! Exposes current membership and the full audit history per change.
//! Everything except `/health` requires the configured bearer token;
//! when no token is configured, the endpoints are disabled outright
//! rather than left open.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tracing::error;

use crate::repository::ChangeId;
use crate::store::{AttentionStore, StoreError};

pub struct AppState {
    pub store: AttentionStore,
    pub dashboard_auth_token: Option<String>,
}

pub fn dashboard_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/changes/{project}/{number}/attention",
            get(attention_handler),
        )
        .route(
            "/changes/{project}/{number}/attention/history",
            get(history_handler),
        )
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "attention-server"
    }))
}

/// Check the Authorization header against the configured token.
///
/// No token configured means the dashboard is disabled: 403 for everyone.
/// A configured token with a missing or wrong credential yields 401.
fn check_auth(headers: &HeaderMap, expected: &Option<String>) -> Result<(), StatusCode> {
    let Some(expected) = expected else {
        return Err(StatusCode::FORBIDDEN);
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

fn store_error_response(change: &ChangeId, err: StoreError) -> Response {
    error!("dashboard read failed for {}: {}", change, err);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn attention_handler(
    headers: HeaderMap,
    Path((project, number)): Path<(String, u64)>,
    State(state): State<Arc<AppState>>,
) -> Response {
    if let Err(status) = check_auth(&headers, &state.dashboard_auth_token) {
        return status.into_response();
    }

    let change = ChangeId::new(project, number);
    match state.store.current_members(&change).await {
        Ok(members) => Json(json!({
            "project": change.project,
            "number": change.number,
            "attention_set": members,
        }))
        .into_response(),
        Err(err) => store_error_response(&change, err),
    }
}

async fn history_handler(
    headers: HeaderMap,
    Path((project, number)): Path<(String, u64)>,
    State(state): State<Arc<AppState>>,
) -> Response {
    if let Err(status) = check_auth(&headers, &state.dashboard_auth_token) {
        return status.into_response();
    }

    let change = ChangeId::new(project, number);
    match state.store.history(&change).await {
        Ok(history) => Json(json!({
            "project": change.project,
            "number": change.number,
            "updates": history,
        }))
        .into_response(),
        Err(err) => store_error_response(&change, err),
    }
}
