use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    TemperatureIndoor,
    TemperatureOutdoor,
    TemperatureHeatingSupply,
    TemperatureHeatingReturn,
    HumidityIndoor,
    HumidityOutdoor,
    PressureOutdoor,
    PowerConsumption,
    Voltage,
}

impl SensorType {
    pub const ALL: [SensorType; 9] = [
        Self::TemperatureIndoor,
        Self::TemperatureOutdoor,
        Self::TemperatureHeatingSupply,
        Self::TemperatureHeatingReturn,
        Self::HumidityIndoor,
        Self::HumidityOutdoor,
        Self::PressureOutdoor,
        Self::PowerConsumption,
        Self::Voltage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TemperatureIndoor => "temperature_indoor",
            Self::TemperatureOutdoor => "temperature_outdoor",
            Self::TemperatureHeatingSupply => "temperature_heating_supply",
            Self::TemperatureHeatingReturn => "temperature_heating_return",
            Self::HumidityIndoor => "humidity_indoor",
            Self::HumidityOutdoor => "humidity_outdoor",
            Self::PressureOutdoor => "pressure_outdoor",
            Self::PowerConsumption => "power_consumption",
            Self::Voltage => "voltage",
        }
    }

    // Unit labels are stored verbatim by the ingestion backend.
    pub fn unit(self) -> &'static str {
        match self {
            Self::TemperatureIndoor
            | Self::TemperatureOutdoor
            | Self::TemperatureHeatingSupply
            | Self::TemperatureHeatingReturn => "°C",
            Self::HumidityIndoor | Self::HumidityOutdoor => "%",
            Self::PressureOutdoor => "мм рт.ст.",
            Self::PowerConsumption => "кВт",
            Self::Voltage => "В",
        }
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a single ingestion request. Serializes to exactly
/// `{sensor_type, value, unit}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: String,
}

impl SensorReading {
    pub fn new(sensor_type: SensorType, value: f64) -> Self {
        Self {
            sensor_type,
            value,
            unit: sensor_type.unit().to_string(),
        }
    }
}
