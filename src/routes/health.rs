// src/routes/health.rs
//! Health check endpoint for the dashboard service.
//!
//! Besides confirming the HTTP server responds, `/health` reports the feed
//! subscription state, since a stopped feed is not retried and otherwise
//! only shows as a dashboard that no longer changes.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::SnapshotState;
use crate::FeedStatus;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    feed: FeedStatus,
    records_processed: u64,
}

/// Handle `GET /health`.
async fn health(State(snapshots): State<SnapshotState>) -> Json<HealthResponse> {
    // ---
    let snapshot = snapshots.borrow();
    Json(HealthResponse {
        status: "ok",
        feed: snapshot.feed.clone(),
        records_processed: snapshot.records_processed,
    })
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<SnapshotState> {
    Router::new().route("/health", get(health))
}
