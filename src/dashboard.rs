//! Dashboard state and its single writer.
//!
//! Feed records are queued to one writer task which applies them in arrival
//! order: normalize, extend the trends, recompute the recommendation. Each
//! update is published as a whole [`DashboardSnapshot`] through a `watch`
//! channel, so readers never observe a partially applied record.

use chrono::{DateTime, Local, Utc};
use rand::Rng;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{recommend_with, RawSensorRecord, Recommendation, SensorReading, Trends};

// ---

/// Lifecycle of the feed subscription as seen by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum FeedStatus {
    Idle,
    Connecting,
    Streaming,
    Stopped(String),
}

/// Message from the feed to the dashboard writer.
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    /// A child record appeared under the feed path.
    Record { key: String, record: RawSensorRecord },
    Status(FeedStatus),
}

/// Everything the dashboard displays, as of the last applied record.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    // ---
    pub reading: Option<SensorReading>,
    pub recommendation: Option<Recommendation>,
    pub trends: Trends,
    pub records_processed: u64,
    pub last_key: Option<String>,
    pub feed: FeedStatus,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    // ---
    pub fn new() -> Self {
        Self {
            reading: None,
            recommendation: None,
            trends: Trends::new(),
            records_processed: 0,
            last_key: None,
            feed: FeedStatus::Idle,
            updated_at: None,
        }
    }

    /// Apply one feed record under the given chart label.
    pub fn apply_record<R: Rng + ?Sized>(
        &mut self,
        key: &str,
        record: &RawSensorRecord,
        label: &str,
        rng: &mut R,
    ) {
        // ---
        let sample = record.to_sample();
        let reading = sample.to_reading();

        self.trends.push(label, &sample);
        self.recommendation = Some(recommend_with(&reading, rng));
        self.reading = Some(reading);
        self.records_processed += 1;
        self.last_key = Some(key.to_string());
        self.updated_at = Some(Utc::now());
    }
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Chart label for a record arriving now, in local wall-clock time.
pub fn arrival_label() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Spawn the dashboard writer.
///
/// Returns the queue feeding it, a receiver for published snapshots, and the
/// writer's task handle. The writer exits once every sender is dropped.
pub fn spawn(
    queue_depth: usize,
) -> (
    mpsc::Sender<DashboardEvent>,
    watch::Receiver<DashboardSnapshot>,
    JoinHandle<()>,
) {
    // ---
    let (event_tx, event_rx) = mpsc::channel(queue_depth.max(1));
    let (snapshot_tx, snapshot_rx) = watch::channel(DashboardSnapshot::new());

    let handle = tokio::spawn(run_writer(event_rx, snapshot_tx));
    (event_tx, snapshot_rx, handle)
}

async fn run_writer(
    mut events: mpsc::Receiver<DashboardEvent>,
    snapshot: watch::Sender<DashboardSnapshot>,
) {
    // ---
    info!("Dashboard writer started");

    while let Some(event) = events.recv().await {
        match event {
            DashboardEvent::Record { key, record } => {
                let label = arrival_label();
                snapshot.send_modify(|s| s.apply_record(&key, &record, &label, &mut rand::rng()));

                let current = snapshot.borrow();
                debug!(
                    key = %key,
                    processed = current.records_processed,
                    irrigation_needed = current
                        .recommendation
                        .as_ref()
                        .map(|r| r.irrigation_needed),
                    "Applied sensor record"
                );
            }
            DashboardEvent::Status(status) => {
                if let FeedStatus::Stopped(reason) = &status {
                    warn!("Feed stopped, dashboard will no longer update: {}", reason);
                } else {
                    debug!("Feed status: {:?}", status);
                }
                snapshot.send_modify(|s| s.feed = status);
            }
        }
    }

    info!("Dashboard writer finished, all feed senders dropped");
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::{Metric, ADVISORY_CRITICAL, TREND_CAPACITY};
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    fn record(moisture: f64) -> RawSensorRecord {
        serde_json::from_value(json!({
            "soil_moisture": moisture,
            "temperature": 24.0,
            "humidity": 58.0,
            "lightIntensity": 300,
            "isRaining": false
        }))
        .unwrap()
    }

    #[test]
    fn test_initial_snapshot_has_no_reading() {
        // ---
        let snapshot = DashboardSnapshot::new();

        assert!(snapshot.reading.is_none());
        assert!(snapshot.recommendation.is_none());
        assert_eq!(snapshot.records_processed, 0);
        assert_eq!(snapshot.feed, FeedStatus::Idle);
        assert_eq!(snapshot.trends.soil_moisture.len(), 1);
    }

    #[test]
    fn test_apply_record_updates_every_output() {
        // ---
        let mut rng = StdRng::seed_from_u64(7);
        let mut snapshot = DashboardSnapshot::new();
        snapshot.apply_record("-k1", &record(12.0), "09:15:00", &mut rng);

        let reading = snapshot.reading.unwrap();
        assert_eq!(reading.soil_moisture, Metric::Value(12.0));

        let rec = snapshot.recommendation.as_ref().unwrap();
        assert!(rec.irrigation_needed);
        assert_eq!(rec.advisories[0], ADVISORY_CRITICAL);

        assert_eq!(snapshot.trends.soil_moisture.values(), vec![0.0, 12.0]);
        assert_eq!(snapshot.records_processed, 1);
        assert_eq!(snapshot.last_key.as_deref(), Some("-k1"));
        assert!(snapshot.updated_at.is_some());
    }

    #[test]
    fn test_trends_record_coerced_values_not_sentinels() {
        // ---
        let mut rng = StdRng::seed_from_u64(7);
        let mut snapshot = DashboardSnapshot::new();
        let raw: RawSensorRecord =
            serde_json::from_value(json!({ "soil_moisture": "--", "temperature": -2 })).unwrap();
        snapshot.apply_record("-k1", &raw, "t", &mut rng);

        assert_eq!(snapshot.reading.unwrap().soil_moisture, Metric::Missing);
        assert_eq!(snapshot.trends.soil_moisture.values(), vec![0.0, 0.0]);
        assert_eq!(snapshot.trends.temperature.values(), vec![0.0, -2.0]);
    }

    #[tokio::test]
    async fn test_writer_applies_records_in_order() {
        // ---
        let (tx, mut rx, handle) = spawn(4);

        tx.send(DashboardEvent::Status(FeedStatus::Streaming)).await.unwrap();
        for i in 0..15 {
            tx.send(DashboardEvent::Record {
                key: format!("-k{i:02}"),
                record: record(i as f64 + 1.0),
            })
            .await
            .unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.records_processed, 15);
        assert_eq!(snapshot.last_key.as_deref(), Some("-k14"));
        assert_eq!(snapshot.feed, FeedStatus::Streaming);
        assert_eq!(snapshot.trends.soil_moisture.len(), TREND_CAPACITY);

        let expected: Vec<f64> = (6..=15).map(|i| i as f64).collect();
        assert_eq!(snapshot.trends.soil_moisture.values(), expected);
    }

    #[test]
    fn test_feed_status_serialization() {
        // ---
        assert_eq!(
            serde_json::to_value(FeedStatus::Streaming).unwrap(),
            json!({ "state": "streaming" })
        );
        assert_eq!(
            serde_json::to_value(FeedStatus::Stopped("cancelled".into())).unwrap(),
            json!({ "state": "stopped", "reason": "cancelled" })
        );
    }
}
