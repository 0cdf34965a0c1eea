//! Realtime sensor feed client.
//!
//! Opens the realtime-database REST stream for the feed path and forwards
//! every newly added child record to the dashboard writer. This module
//! follows the Explicit Module Boundary Pattern (EMBP): stream framing lives
//! in `sse`, child bookkeeping in `children`, and only the client, the
//! subscription handle and the error type are exported.
//!
//! The client is built once by [`FeedClient::new`] and torn down with
//! [`FeedClient::shutdown`]. A [`Subscription`] owns its stream task; dropping
//! it (or calling [`Subscription::unsubscribe`]) stops the stream, so a
//! listener never outlives its owner. A failed stream is reported to the
//! dashboard as stopped and is not retried.

use std::time::Duration;

use reqwest::header::ACCEPT;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{Config, DashboardEvent, FeedStatus};

mod children;
mod sse;

pub use children::{ChildTracker, FeedRecord};
pub use sse::{SseDecoder, SseEvent};

// ---

#[derive(Debug, Error)]
pub enum FeedError {
    // ---
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("feed cancelled by server: {0}")]
    Cancelled(String),

    #[error("feed credentials revoked")]
    AuthRevoked,

    #[error("dashboard is no longer receiving records")]
    SinkClosed,
}

/// HTTP client for the realtime database, bound to one feed path.
#[derive(Debug, Clone)]
pub struct FeedClient {
    // ---
    http: reqwest::Client,
    stream_url: String,
}

impl FeedClient {
    // ---
    pub fn new(config: &Config) -> Result<Self, FeedError> {
        // ---
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let stream_url = stream_url(
            &config.feed_database_url,
            &config.feed_path,
            config.feed_auth_token.as_deref(),
        );

        info!("Feed client ready for path '{}'", config.feed_path);
        Ok(Self { http, stream_url })
    }

    /// Start streaming child records into `sink`.
    ///
    /// The returned handle must be kept alive for as long as updates are
    /// wanted.
    pub fn subscribe(&self, sink: mpsc::Sender<DashboardEvent>) -> Subscription {
        // ---
        let id = Uuid::new_v4();
        let http = self.http.clone();
        let url = self.stream_url.clone();

        info!(subscription = %id, "Subscribing to sensor feed");

        let task = tokio::spawn(async move {
            let _ = sink.send(DashboardEvent::Status(FeedStatus::Connecting)).await;

            let status = match stream_children(&http, &url, &sink).await {
                Ok(()) => {
                    warn!(subscription = %id, "Feed stream ended");
                    FeedStatus::Stopped("stream ended".to_string())
                }
                Err(FeedError::SinkClosed) => {
                    debug!(subscription = %id, "Dashboard gone, closing feed stream");
                    return;
                }
                Err(e) => {
                    error!(subscription = %id, "Feed stream failed: {}", e);
                    FeedStatus::Stopped(e.to_string())
                }
            };
            let _ = sink.send(DashboardEvent::Status(status)).await;
        });

        Subscription {
            id,
            task: Some(task),
        }
    }

    /// Release the client. Outstanding subscriptions keep their own clone of
    /// the connection pool and must be released separately.
    pub fn shutdown(self) {
        info!("Feed client shut down");
    }
}

/// Handle to a running feed stream.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    // ---
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the stream and wait for its task to wind down.
    pub async fn unsubscribe(mut self) {
        // ---
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        info!(subscription = %self.id, "Unsubscribed from sensor feed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(subscription = %self.id, "Subscription dropped, stream aborted");
        }
    }
}

/// Build the streaming URL: `{base}/{path}.json`, with `?auth=` when a token
/// is configured.
pub fn stream_url(base: &str, path: &str, auth_token: Option<&str>) -> String {
    // ---
    let mut url = format!(
        "{}/{}.json",
        base.trim_end_matches('/'),
        path.trim_matches('/')
    );
    if let Some(token) = auth_token.filter(|t| !t.is_empty()) {
        url.push_str("?auth=");
        url.push_str(token);
    }
    url
}

async fn stream_children(
    http: &reqwest::Client,
    url: &str,
    sink: &mpsc::Sender<DashboardEvent>,
) -> Result<(), FeedError> {
    // ---
    let mut response = http
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(FeedError::Status(response.status()));
    }

    sink.send(DashboardEvent::Status(FeedStatus::Streaming))
        .await
        .map_err(|_| FeedError::SinkClosed)?;
    info!("Feed stream open");

    let mut decoder = SseDecoder::new();
    let mut tracker = ChildTracker::new();
    let mut forwarded: u64 = 0;

    while let Some(chunk) = response.chunk().await? {
        for event in decoder.push(&chunk) {
            for FeedRecord { key, record } in tracker.on_event(&event)? {
                sink.send(DashboardEvent::Record { key, record })
                    .await
                    .map_err(|_| FeedError::SinkClosed)?;
                forwarded += 1;
            }
        }
    }

    if decoder.has_partial() {
        debug!("Feed stream closed mid-frame, discarding partial event");
    }
    info!(
        "Feed stream closed after forwarding {} records ({} children tracked)",
        forwarded,
        tracker.seen_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_stream_url_without_token() {
        // ---
        assert_eq!(
            stream_url("https://farm.example.app/", "/sensorData/", None),
            "https://farm.example.app/sensorData.json"
        );
    }

    #[test]
    fn test_stream_url_with_token() {
        // ---
        assert_eq!(
            stream_url("https://farm.example.app", "sensorData", Some("s3cret")),
            "https://farm.example.app/sensorData.json?auth=s3cret"
        );
        assert_eq!(
            stream_url("https://farm.example.app", "sensorData", Some("")),
            "https://farm.example.app/sensorData.json"
        );
    }

    #[tokio::test]
    async fn test_unreachable_feed_reports_stopped() {
        // ---
        let config = Config {
            // Port 9 (discard) on localhost refuses connections.
            feed_database_url: "http://127.0.0.1:9".to_string(),
            feed_path: "sensorData".to_string(),
            feed_auth_token: None,
            listen_port: 0,
            event_queue_depth: 8,
        };
        let client = FeedClient::new(&config).unwrap();
        let (tx, mut rx) = mpsc::channel(8);

        let subscription = client.subscribe(tx);

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, DashboardEvent::Status(FeedStatus::Connecting)));

        match rx.recv().await.unwrap() {
            DashboardEvent::Status(FeedStatus::Stopped(reason)) => assert!(!reason.is_empty()),
            other => panic!("expected stopped status, got {:?}", other),
        }

        subscription.unsubscribe().await;
        client.shutdown();
    }

    #[tokio::test]
    async fn test_dropping_subscription_aborts_stream() {
        // ---
        let config = Config {
            feed_database_url: "http://127.0.0.1:9".to_string(),
            feed_path: "sensorData".to_string(),
            feed_auth_token: None,
            listen_port: 0,
            event_queue_depth: 8,
        };
        let client = FeedClient::new(&config).unwrap();
        // Zero spare capacity: the task parks on its first send.
        let (tx, mut rx) = mpsc::channel(1);
        tx.send(DashboardEvent::Status(FeedStatus::Idle)).await.unwrap();

        let subscription = client.subscribe(tx);
        assert!(subscription.is_active());
        drop(subscription);

        // Drain the pre-filled slot; the aborted task never sends.
        assert!(matches!(rx.recv().await, Some(DashboardEvent::Status(FeedStatus::Idle))));
        assert!(rx.recv().await.is_none());
    }
}
