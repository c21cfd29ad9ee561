pub mod commands;
pub mod config;
pub mod endpoints;
pub mod history;
pub mod sensors;
pub mod state;
pub mod types;

pub use commands::{
    Command, CommandError, CommandId, CommandRow, CommandStatus, ControllerCommand, StatusUpdate,
};
pub use config::{BackendConfig, ControllerConfig};
pub use endpoints::*;
pub use sensors::read_sensors;
pub use state::ControllerState;
pub use types::{SensorReading, SensorType};
