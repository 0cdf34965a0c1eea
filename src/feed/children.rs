//! Child-added tracking over the realtime-database event stream.
//!
//! The stream reports writes (`put` replaces the value at a path, `patch`
//! merges into it). The dashboard only cares about children appearing under
//! the feed path for the first time, so this tracker remembers which keys it
//! has already emitted.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::sse::SseEvent;
use super::FeedError;
use crate::RawSensorRecord;

// ---

/// A record that newly appeared under the feed path.
#[derive(Debug, Clone)]
pub struct FeedRecord {
    pub key: String,
    pub record: RawSensorRecord,
}

#[derive(Debug, Deserialize)]
struct WritePayload {
    path: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default)]
pub struct ChildTracker {
    seen: HashSet<String>,
}

impl ChildTracker {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Translate one stream event into the children it adds, in key order.
    ///
    /// Undecodable writes are logged and skipped; only `cancel` and
    /// `auth_revoked` end the stream.
    pub fn on_event(&mut self, event: &SseEvent) -> Result<Vec<FeedRecord>, FeedError> {
        // ---
        match event.event.as_str() {
            "put" => self.on_write(&event.data, true),
            "patch" => self.on_write(&event.data, false),
            "keep-alive" => Ok(Vec::new()),
            "cancel" => Err(FeedError::Cancelled(event.data.clone())),
            "auth_revoked" => Err(FeedError::AuthRevoked),
            other => {
                debug!("Ignoring stream event '{}'", other);
                Ok(Vec::new())
            }
        }
    }

    fn on_write(&mut self, data: &str, replace: bool) -> Result<Vec<FeedRecord>, FeedError> {
        // ---
        let payload: WritePayload = match serde_json::from_str(data) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Skipping undecodable stream frame ({}): {}", e, data);
                return Ok(Vec::new());
            }
        };
        let segments: Vec<&str> = payload
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Ok(self.on_root_write(payload.data, replace)),
            [key] => Ok(self.on_child_write(key, payload.data).into_iter().collect()),
            [key, ..] => {
                trace!("Change below existing child '{}' at {}", key, payload.path);
                Ok(Vec::new())
            }
        }
    }

    fn on_root_write(&mut self, data: Value, replace: bool) -> Vec<FeedRecord> {
        // ---
        let children = match data {
            Value::Object(map) => map,
            // A scalar or null put replaces every child under the path.
            _ if replace => {
                self.seen.clear();
                return Vec::new();
            }
            _ => return Vec::new(),
        };

        if replace {
            self.seen.retain(|key| children.contains_key(key));
        }

        let mut entries: Vec<(String, Value)> = children.into_iter().collect();
        entries.sort_by(|a, b| child_key_order(&a.0, &b.0));

        entries
            .into_iter()
            .filter_map(|(key, value)| self.on_child_write(&key, value))
            .collect()
    }

    fn on_child_write(&mut self, key: &str, value: Value) -> Option<FeedRecord> {
        // ---
        if value.is_null() {
            self.seen.remove(key);
            return None;
        }
        if self.seen.contains(key) {
            return None;
        }
        self.seen.insert(key.to_string());

        if !is_truthy(&value) {
            debug!("Skipping empty child '{}'", key);
            return None;
        }

        Some(FeedRecord {
            key: key.to_string(),
            record: to_record(value),
        })
    }
}

/// Realtime-database child ordering: keys that are canonical 32-bit
/// integers come first in numeric order, then all other keys
/// lexicographically.
pub fn child_key_order(a: &str, b: &str) -> Ordering {
    // ---
    match (int_key(a), int_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// `"10"` and `"-3"` qualify; `"007"`, `"+1"` and out-of-range values do not.
fn int_key(key: &str) -> Option<i32> {
    key.parse::<i32>()
        .ok()
        .filter(|n| n.to_string() == key)
}

fn to_record(value: Value) -> RawSensorRecord {
    // Every field accepts any JSON value, so only non-objects fall through.
    serde_json::from_value(value).unwrap_or_default()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
