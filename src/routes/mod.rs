//! Route gateway for the dashboard HTTP API (EMBP).
//!
//! Sibling modules export subrouters; this gateway merges them and attaches
//! the shared snapshot receiver so `main.rs` only needs [`router`].

use axum::Router;
use tokio::sync::watch;

use crate::DashboardSnapshot;

mod dashboard;
mod health;

// ---

/// State shared by every route: the latest published dashboard snapshot.
pub type SnapshotState = watch::Receiver<DashboardSnapshot>;

pub fn router(snapshots: SnapshotState) -> Router {
    // ---
    Router::new()
        .merge(dashboard::router())
        .merge(health::router())
        .with_state(snapshots)
}
