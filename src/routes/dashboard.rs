// src/routes/dashboard.rs
//! Dashboard read endpoints.
//!
//! Sibling of `health.rs` under the `routes` gateway (EMBP). Every handler
//! copies the latest published snapshot out of the watch channel and shapes
//! it for the client:
//! - `/readings/latest`: raw snapshot, numbers or the `--` sentinel
//! - `/dashboard`: display strings, prediction and charts
//! - `/trends`: chart series only

use axum::{extract::State, routing::get, Json, Router};
use tracing::debug;

use super::SnapshotState;
use crate::{charts, ChartSeries, DashboardSnapshot, DashboardView};

// ---

pub fn router() -> Router<SnapshotState> {
    // ---
    Router::new()
        .route("/readings/latest", get(latest))
        .route("/dashboard", get(dashboard))
        .route("/trends", get(trends))
}

/// Current snapshot, copied out so the watch lock is released immediately.
fn current(snapshots: &SnapshotState) -> DashboardSnapshot {
    snapshots.borrow().clone()
}

/// `GET /readings/latest` - raw snapshot with numbers or sentinels.
async fn latest(State(snapshots): State<SnapshotState>) -> Json<DashboardSnapshot> {
    // ---
    let snapshot = current(&snapshots);
    debug!(
        "GET /readings/latest - {} records processed",
        snapshot.records_processed
    );
    Json(snapshot)
}

/// `GET /dashboard` - display-ready cards, prediction and charts.
async fn dashboard(State(snapshots): State<SnapshotState>) -> Json<DashboardView> {
    // ---
    let snapshot = current(&snapshots);
    debug!("GET /dashboard - feed {:?}", snapshot.feed);
    Json(DashboardView::from_snapshot(&snapshot))
}

/// `GET /trends` - chart series only.
async fn trends(State(snapshots): State<SnapshotState>) -> Json<Vec<ChartSeries>> {
    Json(charts(&current(&snapshots)))
}
