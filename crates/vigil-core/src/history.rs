//! # Historical Chart Series
//!
//! Synthesizes the per-device chart series from the device's current
//! reading. There is no stored history: every call draws fresh jitter, so
//! two calls with the same arguments return different series.
//!
//! ## Series Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Range │ Points │ Labels                                                │
//! │  ──────┼────────┼────────────────────────────────────────────────────── │
//! │  24h   │   24   │ "0:00", "1:00", ... "23:00"                           │
//! │  7d    │    7   │ "Mon", "Tue", ... "Sun"                               │
//! │  30d   │   30   │ "Day 1", "Day 2", ... "Day 30"                        │
//! │                                                                         │
//! │  temperature = base ± 2.0   (rounded to 0.1)                           │
//! │  humidity    = base ± 5     (rounded, clamped to 0..=100)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::Device;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Maximum temperature deviation from the current reading, in °C.
pub const TEMPERATURE_JITTER: f64 = 2.0;

/// Maximum humidity deviation from the current reading, in percent.
pub const HUMIDITY_JITTER: f64 = 5.0;

// =============================================================================
// Time Range
// =============================================================================

/// Chart window selectable on the device detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl TimeRange {
    /// Number of samples in the series.
    pub const fn points(&self) -> usize {
        match self {
            TimeRange::Day => 24,
            TimeRange::Week => 7,
            TimeRange::Month => 30,
        }
    }

    /// X-axis label for the sample at `index`.
    pub fn label(&self, index: usize) -> String {
        match self {
            TimeRange::Day => format!("{}:00", index),
            TimeRange::Week => WEEKDAYS[index % WEEKDAYS.len()].to_string(),
            TimeRange::Month => format!("Day {}", index + 1),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeRange::Day => write!(f, "24h"),
            TimeRange::Week => write!(f, "7d"),
            TimeRange::Month => write!(f, "30d"),
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "24h" => Ok(TimeRange::Day),
            "7d" => Ok(TimeRange::Week),
            "30d" => Ok(TimeRange::Month),
            other => Err(CoreError::UnknownTimeRange(other.to_string())),
        }
    }
}

// =============================================================================
// Historical Sample
// =============================================================================

/// One point of a device chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSample {
    pub time: String,
    pub temperature: f64,
    pub humidity: u8,
}

/// Builds a chart series around `device`'s current reading.
///
/// ## Example
/// ```rust
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use vigil_core::history::{synthesize_history, TimeRange};
/// # use vigil_core::{Device, DeviceStatus};
/// # let device = Device {
/// #     id: "device-1".into(), name: "Living Room Sensor".into(), kind: "Temperature".into(),
/// #     status: DeviceStatus::Online, temperature: 22.5, humidity: 45,
/// #     battery_level: 78, last_updated: "10 min ago".into(),
/// # };
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let series = synthesize_history(&device, TimeRange::Day, &mut rng);
/// assert_eq!(series.len(), 24);
/// assert_eq!(series[0].time, "0:00");
/// ```
pub fn synthesize_history<R: Rng>(
    device: &Device,
    range: TimeRange,
    rng: &mut R,
) -> Vec<HistoricalSample> {
    let base_temperature = device.temperature;
    let base_humidity = f64::from(device.humidity);

    (0..range.points())
        .map(|i| {
            let temperature_variation =
                rng.random_range(-TEMPERATURE_JITTER..TEMPERATURE_JITTER);
            let humidity_variation = rng.random_range(-HUMIDITY_JITTER..HUMIDITY_JITTER);

            HistoricalSample {
                time: range.label(i),
                temperature: round_tenths(base_temperature + temperature_variation),
                humidity: (base_humidity + humidity_variation).round().clamp(0.0, 100.0) as u8,
            }
        })
        .collect()
}

/// Rounds to one decimal place, the precision sensor readings are shown at.
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeviceStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn device(temperature: f64, humidity: u8) -> Device {
        Device {
            id: "device-1".to_string(),
            name: "Living Room Sensor".to_string(),
            kind: "Temperature".to_string(),
            status: DeviceStatus::Online,
            temperature,
            humidity,
            battery_level: 78,
            last_updated: "10 min ago".to_string(),
        }
    }

    #[test]
    fn test_day_labels_in_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let series = synthesize_history(&device(22.5, 45), TimeRange::Day, &mut rng);

        let labels: Vec<_> = series.iter().map(|s| s.time.clone()).collect();
        let expected: Vec<_> = (0..24).map(|h| format!("{}:00", h)).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_week_and_month_labels() {
        let mut rng = StdRng::seed_from_u64(2);
        let week = synthesize_history(&device(22.5, 45), TimeRange::Week, &mut rng);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].time, "Mon");
        assert_eq!(week[6].time, "Sun");

        let month = synthesize_history(&device(22.5, 45), TimeRange::Month, &mut rng);
        assert_eq!(month.len(), 30);
        assert_eq!(month[0].time, "Day 1");
        assert_eq!(month[29].time, "Day 30");
    }

    #[test]
    fn test_jitter_is_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        for sample in synthesize_history(&device(22.5, 45), TimeRange::Month, &mut rng) {
            assert!((sample.temperature - 22.5).abs() <= TEMPERATURE_JITTER + 0.05);
            assert!((40..=50).contains(&sample.humidity));
        }
    }

    #[test]
    fn test_humidity_is_clamped() {
        let mut rng = StdRng::seed_from_u64(4);
        for sample in synthesize_history(&device(20.0, 98), TimeRange::Month, &mut rng) {
            assert!(sample.humidity <= 100);
        }
        for sample in synthesize_history(&device(20.0, 1), TimeRange::Month, &mut rng) {
            assert!(sample.humidity <= 6);
        }
    }

    #[test]
    fn test_time_range_parsing() {
        assert_eq!("24h".parse::<TimeRange>().unwrap(), TimeRange::Day);
        assert_eq!("7d".parse::<TimeRange>().unwrap(), TimeRange::Week);
        assert_eq!("30d".parse::<TimeRange>().unwrap(), TimeRange::Month);
        assert!(matches!(
            "1y".parse::<TimeRange>(),
            Err(CoreError::UnknownTimeRange(_))
        ));
        assert_eq!(TimeRange::Week.to_string(), "7d");
    }

    #[test]
    fn test_round_tenths() {
        assert_eq!(round_tenths(22.46), 22.5);
        assert_eq!(round_tenths(-0.04), -0.0);
    }
}
