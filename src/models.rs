//! Data models for the irrigation dashboard.
//!
//! Feed records arrive loosely typed. They are coerced into a [`Sample`] of
//! plain numbers (used for trend charts) and a [`SensorReading`] where any
//! value that is not strictly positive is replaced by the sentinel.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Display stand-in for a metric without a valid reading.
pub const SENTINEL: &str = "--";

// ---

/// Raw sensor record as pushed under the feed path.
///
/// Devices and seed scripts push numbers, numeric strings or nothing at all,
/// so every field is kept as an arbitrary JSON value.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSensorRecord {
    // ---
    #[serde(default)]
    pub soil_moisture: Value,
    #[serde(default)]
    pub temperature: Value,
    #[serde(default)]
    pub humidity: Value,
    #[serde(default, rename = "lightIntensity")]
    pub light_intensity: Value,
    #[serde(default, rename = "isRaining")]
    pub is_raining: Value,
}

/// Coerced numeric values of one record. Unparseable values are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    // ---
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub light_intensity: f64,
    pub is_raining: bool,
}

/// One displayed metric: a positive value or the sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Value(f64),
    Missing,
}

/// Normalized reading shown on the dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorReading {
    // ---
    pub soil_moisture: Metric,
    pub temperature: Metric,
    pub humidity: Metric,
    pub light_intensity: Metric,
    pub is_raining: bool,
}

impl RawSensorRecord {
    // ---
    pub fn to_sample(&self) -> Sample {
        // ---
        Sample {
            soil_moisture: coerce_number(&self.soil_moisture),
            temperature: coerce_number(&self.temperature),
            humidity: coerce_number(&self.humidity),
            light_intensity: coerce_number(&self.light_intensity),
            // Only a literal boolean counts; "true" or 1 do not.
            is_raining: self.is_raining == Value::Bool(true),
        }
    }
}

impl Sample {
    // ---
    pub fn to_reading(&self) -> SensorReading {
        // ---
        SensorReading {
            soil_moisture: Metric::from_coerced(self.soil_moisture),
            temperature: Metric::from_coerced(self.temperature),
            humidity: Metric::from_coerced(self.humidity),
            light_intensity: Metric::from_coerced(self.light_intensity),
            is_raining: self.is_raining,
        }
    }
}

impl Metric {
    // ---
    pub fn from_coerced(value: f64) -> Self {
        if value > 0.0 {
            Metric::Value(value)
        } else {
            Metric::Missing
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Missing => None,
        }
    }

    /// Format with a unit suffix, e.g. `45%`, `31.5°C`, or `--%`.
    pub fn display(&self, unit: &str) -> String {
        match self {
            Metric::Value(v) => format!("{v}{unit}"),
            Metric::Missing => format!("{SENTINEL}{unit}"),
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Value(v) => serializer.serialize_f64(*v),
            Metric::Missing => serializer.serialize_str(SENTINEL),
        }
    }
}

/// Best-effort numeric coercion of a feed value.
///
/// Numbers are taken as-is, strings are parsed from their longest leading
/// float prefix. Everything else, and any non-finite result, becomes zero.
pub fn coerce_number(value: &Value) -> f64 {
    // ---
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parse the longest prefix of `s` (after leading whitespace) that forms a
/// decimal float: optional sign, digits with an optional fraction, and an
/// optional exponent.
fn parse_float_prefix(s: &str) -> Option<f64> {
    // ---
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawSensorRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_numeric_fields_pass_through() {
        // ---
        let raw = record(json!({
            "soil_moisture": 42.5,
            "temperature": 28,
            "humidity": 61.2,
            "lightIntensity": 512,
            "isRaining": false
        }));
        let sample = raw.to_sample();

        assert_eq!(sample.soil_moisture, 42.5);
        assert_eq!(sample.temperature, 28.0);
        assert_eq!(sample.humidity, 61.2);
        assert_eq!(sample.light_intensity, 512.0);
        assert!(!sample.is_raining);
    }

    #[test]
    fn test_string_coercion_uses_float_prefix() {
        // ---
        assert_eq!(coerce_number(&json!("12.5")), 12.5);
        assert_eq!(coerce_number(&json!("  33%")), 33.0);
        assert_eq!(coerce_number(&json!("-4.0C")), -4.0);
        assert_eq!(coerce_number(&json!(".5")), 0.5);
        assert_eq!(coerce_number(&json!("1e2x")), 100.0);
        assert_eq!(coerce_number(&json!("7e")), 7.0);
    }

    #[test]
    fn test_unparseable_values_become_zero() {
        // ---
        assert_eq!(coerce_number(&json!("--")), 0.0);
        assert_eq!(coerce_number(&json!("abc")), 0.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!(".")), 0.0);
        assert_eq!(coerce_number(&json!(true)), 0.0);
        assert_eq!(coerce_number(&Value::Null), 0.0);
        assert_eq!(coerce_number(&json!([1, 2])), 0.0);
        assert_eq!(coerce_number(&json!({"v": 1})), 0.0);
        assert_eq!(coerce_number(&json!("1e999")), 0.0);
    }

    #[test]
    fn test_missing_fields_default_to_sentinel() {
        // ---
        let reading = record(json!({})).to_sample().to_reading();

        assert_eq!(reading.soil_moisture, Metric::Missing);
        assert_eq!(reading.temperature, Metric::Missing);
        assert_eq!(reading.humidity, Metric::Missing);
        assert_eq!(reading.light_intensity, Metric::Missing);
        assert!(!reading.is_raining);
    }

    #[test]
    fn test_non_positive_values_surface_sentinel_but_keep_sample() {
        // ---
        let raw = record(json!({ "soil_moisture": 0, "temperature": -3.5 }));
        let sample = raw.to_sample();
        let reading = sample.to_reading();

        assert_eq!(sample.temperature, -3.5);
        assert_eq!(reading.soil_moisture, Metric::Missing);
        assert_eq!(reading.temperature, Metric::Missing);
    }

    #[test]
    fn test_rain_flag_requires_literal_true() {
        // ---
        assert!(record(json!({ "isRaining": true })).to_sample().is_raining);
        assert!(!record(json!({ "isRaining": "true" })).to_sample().is_raining);
        assert!(!record(json!({ "isRaining": 1 })).to_sample().is_raining);
    }

    #[test]
    fn test_metric_display_and_serialization() {
        // ---
        assert_eq!(Metric::Value(45.0).display("%"), "45%");
        assert_eq!(Metric::Value(31.5).display("°C"), "31.5°C");
        assert_eq!(Metric::Missing.display("%"), "--%");
        assert_eq!(Metric::Missing.display(""), "--");

        assert_eq!(serde_json::to_value(Metric::Value(12.0)).unwrap(), json!(12.0));
        assert_eq!(serde_json::to_value(Metric::Missing).unwrap(), json!("--"));
    }
}
