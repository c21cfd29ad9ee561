use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;

use crate::{sensors::round_to, types::SensorType};

pub const DEFAULT_SAMPLES: usize = 288;
pub const DEFAULT_INTERVAL_MINUTES: i64 = 5;
/// One week at the default interval.
pub const MAX_SAMPLES: usize = 7 * DEFAULT_SAMPLES;

/// Reading with an explicit timestamp, used for bulk backfill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalReading {
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub fn history_range(sensor_type: SensorType) -> (f64, f64) {
    match sensor_type {
        SensorType::TemperatureIndoor => (20.0, 24.0),
        SensorType::TemperatureOutdoor => (-10.0, 30.0),
        SensorType::TemperatureHeatingSupply => (60.0, 80.0),
        SensorType::TemperatureHeatingReturn => (40.0, 60.0),
        SensorType::HumidityIndoor => (30.0, 60.0),
        SensorType::HumidityOutdoor => (40.0, 90.0),
        SensorType::PressureOutdoor => (740.0, 780.0),
        SensorType::PowerConsumption => (1.0, 8.0),
        SensorType::Voltage => (220.0, 240.0),
    }
}

/// Builds `samples` points per sensor going backwards from `now`, newest
/// first. Values ride a slow sine wave of a tenth of the range on top of
/// uniform noise, so they can exceed the nominal range by that amplitude.
/// `samples` is capped at [`MAX_SAMPLES`].
pub fn generate_history<R: Rng + ?Sized>(
    now: DateTime<Utc>,
    samples: usize,
    interval: Duration,
    rng: &mut R,
) -> Vec<HistoricalReading> {
    let samples = samples.min(MAX_SAMPLES);
    let mut readings = Vec::with_capacity(samples * SensorType::ALL.len());

    for i in 0..samples {
        let timestamp = now - interval * i as i32;
        let wave = (i as f64 / 10.0).sin();

        for kind in SensorType::ALL {
            let (min, max) = history_range(kind);
            let span = max - min;
            let value = min + rng.random::<f64>() * span + wave * span / 10.0;

            readings.push(HistoricalReading {
                sensor_type: kind,
                value: round_to(value, 2),
                unit: kind.unit(),
                timestamp,
            });
        }
    }

    readings
}
