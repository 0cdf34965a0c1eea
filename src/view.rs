//! Presentation view of a dashboard snapshot.
//!
//! Turns raw numbers into the strings the dashboard cards show, fills in the
//! placeholder texts used before the first record arrives, and shapes the
//! trend buffers into chart series.

use serde::Serialize;

use crate::{DashboardSnapshot, FeedStatus, Metric, TrendBuffer};

pub const PENDING_DECISION: &str = "Analyzing...";
pub const PENDING_DURATION: &str = "-- min";
pub const PENDING_CONFIDENCE: &str = "-- %";
pub const PENDING_ADVISORY: &str = "Waiting for data...";

// ---

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub cards: SensorCards,
    pub prediction: PredictionView,
    pub charts: Vec<ChartSeries>,
    pub feed: FeedStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorCards {
    pub soil_moisture: String,
    pub temperature: String,
    pub humidity: String,
    pub light_intensity: String,
    pub rain: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionView {
    pub irrigation_needed: String,
    pub recommended_duration: String,
    pub confidence: String,
    pub recommendations: Vec<String>,
}

/// One line chart: values with their x-axis labels.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub title: &'static str,
    pub y_axis_suffix: &'static str,
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

impl DashboardView {
    // ---
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        // ---
        let cards = match &snapshot.reading {
            Some(r) => SensorCards {
                soil_moisture: r.soil_moisture.display("%"),
                temperature: r.temperature.display("°C"),
                humidity: r.humidity.display("%"),
                light_intensity: r.light_intensity.display(""),
                rain: yes_no(r.is_raining),
            },
            None => SensorCards {
                soil_moisture: Metric::Missing.display("%"),
                temperature: Metric::Missing.display("°C"),
                humidity: Metric::Missing.display("%"),
                light_intensity: Metric::Missing.display(""),
                rain: yes_no(false),
            },
        };

        let prediction = match &snapshot.recommendation {
            Some(rec) => PredictionView {
                irrigation_needed: yes_no(rec.irrigation_needed),
                recommended_duration: format!("{} min", rec.duration_minutes),
                confidence: format!("{} %", rec.confidence_percent),
                recommendations: rec.advisories.clone(),
            },
            None => PredictionView {
                irrigation_needed: PENDING_DECISION.to_string(),
                recommended_duration: PENDING_DURATION.to_string(),
                confidence: PENDING_CONFIDENCE.to_string(),
                recommendations: vec![PENDING_ADVISORY.to_string()],
            },
        };

        Self {
            cards,
            prediction,
            charts: charts(snapshot),
            feed: snapshot.feed.clone(),
        }
    }
}

/// Chart series for moisture, temperature and humidity, in that order.
pub fn charts(snapshot: &DashboardSnapshot) -> Vec<ChartSeries> {
    // ---
    let trends = &snapshot.trends;
    vec![
        chart("Soil Moisture", "%", &trends.soil_moisture),
        chart("Temperature", "°C", &trends.temperature),
        chart("Humidity", "%", &trends.humidity),
    ]
}

fn chart(title: &'static str, y_axis_suffix: &'static str, buffer: &TrendBuffer) -> ChartSeries {
    ChartSeries {
        title,
        y_axis_suffix,
        labels: alternate_labels(&buffer.labels()),
        data: buffer.values(),
    }
}

/// Blank every odd-indexed label so a narrow x-axis stays readable.
pub fn alternate_labels(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .enumerate()
        .map(|(i, l)| if i % 2 == 0 { l.clone() } else { String::new() })
        .collect()
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "Yes" } else { "No" };
    text.to_string()
}
