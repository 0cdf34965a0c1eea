//! Irrigation recommendation heuristic.
//!
//! A threshold rule over soil moisture with random jitter on the duration and
//! confidence figures. The jitter stands in for a trained model and is kept
//! bounded: duration never drops below five minutes when irrigation is needed
//! and confidence stays within 70..=95.

use rand::Rng;
use serde::Serialize;

use crate::SensorReading;

/// Soil moisture (%) below which irrigation is recommended.
pub const MOISTURE_LOW: f64 = 40.0;

/// Soil moisture (%) below which irrigation is urgent.
pub const MOISTURE_CRITICAL: f64 = 20.0;

/// Air temperature (°C) above which extra watering is advised.
pub const TEMPERATURE_HIGH: f64 = 32.0;

pub const MIN_DURATION_MINUTES: u32 = 5;

pub const ADVISORY_CRITICAL: &str = "Critical: Soil moisture very low - irrigate immediately";
pub const ADVISORY_LOW: &str = "Soil moisture low - irrigate soon";
pub const ADVISORY_ADEQUATE: &str = "Soil moisture adequate - no irrigation needed now";
pub const ADVISORY_HEAT: &str = "High temperature - consider extra watering";
pub const ADVISORY_RAIN: &str = "Rain detected - consider reducing irrigation duration";

// ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    // ---
    pub irrigation_needed: bool,
    pub duration_minutes: u32,
    pub confidence_percent: u32,
    pub advisories: Vec<String>,
}

/// Derive a recommendation using the thread-local random generator.
pub fn recommend(reading: &SensorReading) -> Recommendation {
    recommend_with(reading, &mut rand::rng())
}

/// Derive a recommendation drawing jitter from `rng`.
///
/// A missing moisture value fails every threshold comparison, so it yields
/// "no irrigation" and the adequate advisory.
pub fn recommend_with<R: Rng + ?Sized>(reading: &SensorReading, rng: &mut R) -> Recommendation {
    // ---
    let moisture = reading.soil_moisture.value();
    let below = |threshold: f64| moisture.is_some_and(|m| m < threshold);

    let irrigation_needed = below(MOISTURE_LOW);

    let duration_minutes = match moisture {
        Some(m) if irrigation_needed => {
            let jitter = rng.random::<f64>() * 5.0;
            let minutes = ((MOISTURE_LOW - m) * 0.5 + jitter).round() as u32;
            minutes.max(MIN_DURATION_MINUTES)
        }
        _ => 0,
    };

    let confidence_percent = (70.0 + rng.random::<f64>() * 25.0).round() as u32;

    let mut advisories = Vec::with_capacity(3);
    if below(MOISTURE_CRITICAL) {
        advisories.push(ADVISORY_CRITICAL.to_string());
    } else if below(MOISTURE_LOW) {
        advisories.push(ADVISORY_LOW.to_string());
    } else {
        advisories.push(ADVISORY_ADEQUATE.to_string());
    }
    if reading.temperature.value().is_some_and(|t| t > TEMPERATURE_HIGH) {
        advisories.push(ADVISORY_HEAT.to_string());
    }
    if reading.is_raining {
        advisories.push(ADVISORY_RAIN.to_string());
    }

    Recommendation {
        irrigation_needed,
        duration_minutes,
        confidence_percent,
        advisories,
    }
}
