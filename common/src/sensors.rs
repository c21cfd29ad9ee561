use std::ops::RangeInclusive;

use rand::Rng;

use crate::types::{SensorReading, SensorType};

/// Baseline and symmetric-or-skewed jitter bounds for a simulated sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorProfile {
    pub baseline: f64,
    pub low: f64,
    pub high: f64,
    pub decimals: u32,
}

impl SensorProfile {
    pub fn range(&self) -> RangeInclusive<f64> {
        (self.baseline + self.low)..=(self.baseline + self.high)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let jitter = rng.random_range(self.low..=self.high);
        let value = round_to(self.baseline + jitter, self.decimals);
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }
}

pub fn profile(sensor_type: SensorType) -> SensorProfile {
    let (baseline, low, high, decimals) = match sensor_type {
        SensorType::TemperatureIndoor => (20.0, -2.0, 2.0, 1),
        SensorType::TemperatureOutdoor => (5.0, -5.0, 5.0, 1),
        SensorType::TemperatureHeatingSupply => (70.0, -5.0, 5.0, 1),
        SensorType::TemperatureHeatingReturn => (50.0, -3.0, 3.0, 1),
        SensorType::HumidityIndoor => (45.0, -10.0, 10.0, 1),
        SensorType::HumidityOutdoor => (70.0, -15.0, 15.0, 1),
        SensorType::PressureOutdoor => (760.0, -20.0, 20.0, 1),
        SensorType::PowerConsumption => (3.0, -1.0, 3.0, 2),
        SensorType::Voltage => (230.0, -5.0, 5.0, 1),
    };

    SensorProfile {
        baseline,
        low,
        high,
        decimals,
    }
}

/// Draws one synthetic reading per known sensor, in catalogue order.
pub fn read_sensors<R: Rng + ?Sized>(rng: &mut R) -> Vec<SensorReading> {
    SensorType::ALL
        .iter()
        .map(|&kind| SensorReading::new(kind, profile(kind).sample(rng)))
        .collect()
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
