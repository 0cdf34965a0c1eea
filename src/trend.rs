//! Rolling trend series for the dashboard charts.

use std::collections::VecDeque;

use serde::Serialize;

use crate::Sample;

/// Number of points kept per chart.
pub const TREND_CAPACITY: usize = 10;

/// Label of the placeholder point every series starts with.
pub const SEED_LABEL: &str = "Start";

// ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub value: f64,
}

/// Fixed-capacity FIFO of the most recent points of one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrendBuffer {
    points: VecDeque<TrendPoint>,
}

impl TrendBuffer {
    // ---
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(TREND_CAPACITY),
        }
    }

    /// A buffer holding only the `("Start", 0)` placeholder.
    pub fn seeded() -> Self {
        let mut buffer = Self::new();
        buffer.push(SEED_LABEL, 0.0);
        buffer
    }

    /// Append a point, evicting the oldest once capacity is reached.
    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        // ---
        if self.points.len() == TREND_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(TrendPoint {
            label: label.into(),
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &TrendPoint> {
        self.points.iter()
    }

    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

impl Default for TrendBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Trend series for the three charted metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trends {
    // ---
    pub soil_moisture: TrendBuffer,
    pub temperature: TrendBuffer,
    pub humidity: TrendBuffer,
}

impl Trends {
    // ---
    pub fn new() -> Self {
        Self {
            soil_moisture: TrendBuffer::seeded(),
            temperature: TrendBuffer::seeded(),
            humidity: TrendBuffer::seeded(),
        }
    }

    /// Record the coerced values of one sample under a shared time label.
    pub fn push(&mut self, label: &str, sample: &Sample) {
        // ---
        self.soil_moisture.push(label, sample.soil_moisture);
        self.temperature.push(label, sample.temperature);
        self.humidity.push(label, sample.humidity);
    }
}

impl Default for Trends {
    fn default() -> Self {
        Self::new()
    }
}
