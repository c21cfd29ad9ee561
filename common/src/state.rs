use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::commands::ControllerCommand;

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub heating_enabled: bool,
    pub room_temperatures: BTreeMap<String, f64>,
}

impl Default for ControllerState {
    fn default() -> Self {
        let room_temperatures = [("living_room", 22.0), ("bedroom", 20.0), ("kitchen", 21.0)]
            .into_iter()
            .map(|(room, temp)| (room.to_string(), temp))
            .collect();

        Self {
            heating_enabled: false,
            room_temperatures,
        }
    }
}

impl ControllerState {
    pub fn heating_label(&self) -> &'static str {
        if self.heating_enabled {
            "ON"
        } else {
            "OFF"
        }
    }

    pub fn setpoint(&self, room_id: &str) -> Option<f64> {
        self.room_temperatures.get(room_id).copied()
    }

    /// Applies a command and reports whether it was recognized.
    ///
    /// `SetRoomTemperature` is acknowledged but does not touch
    /// `room_temperatures`; setpoints are only reported, never stored.
    pub fn execute(&mut self, command: &ControllerCommand) -> bool {
        match command {
            ControllerCommand::EnableHeating => {
                self.heating_enabled = true;
                info!("heating enabled");
                true
            }
            ControllerCommand::DisableHeating => {
                self.heating_enabled = false;
                info!("heating disabled");
                true
            }
            ControllerCommand::SetRoomTemperature {
                room_id,
                temperature,
            } => {
                info!(
                    "set temperature for room {} to {}°C",
                    room_id.as_deref().unwrap_or("<none>"),
                    temperature.map_or_else(|| "<none>".to_string(), |t| t.to_string())
                );
                true
            }
            ControllerCommand::Unknown(command_type) => {
                warn!("unknown command type: {command_type}");
                false
            }
        }
    }
}
