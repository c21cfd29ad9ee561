use chrono::Utc;
use rand::rngs::StdRng;
use tracing::{info, warn};

use home_common::{
    read_sensors, Command, CommandError, CommandId, CommandRow, CommandStatus, ControllerState,
    SensorReading, StatusUpdate,
};

use crate::backend::ControllerBackend;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub readings_sent: usize,
    pub readings_dropped: usize,
    pub acknowledged: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Executed commands whose status write-back was rejected or lost.
    /// They stay pending in the queue.
    pub status_write_failed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("command row {index} could not be decoded")]
    MalformedCommand {
        index: usize,
        #[source]
        source: CommandError,
    },
}

pub struct Controller<B> {
    backend: B,
    state: ControllerState,
    rng: StdRng,
}

impl<B: ControllerBackend> Controller<B> {
    pub fn new(backend: B, state: ControllerState, rng: StdRng) -> Self {
        Self {
            backend,
            state,
            rng,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn read_sensors(&mut self) -> Vec<SensorReading> {
        read_sensors(&mut self.rng)
    }

    /// Posts one reading. Failures are logged and reported as `false`; a
    /// dropped reading is not retried.
    pub async fn send_sensor_data(&self, reading: &SensorReading) -> bool {
        match self.backend.send_reading(reading).await {
            Ok(()) => {
                info!(
                    "sent {}: {} {}",
                    reading.sensor_type, reading.value, reading.unit
                );
                true
            }
            Err(err) => {
                warn!("error sending {}: {err:#}", reading.sensor_type);
                false
            }
        }
    }

    /// Pending rows, or nothing when the fetch failed. The two cases are not
    /// distinguished here; use the backend directly to tell them apart.
    pub async fn fetch_pending_commands(&self) -> Vec<CommandRow> {
        self.backend
            .fetch_pending_commands()
            .await
            .unwrap_or_else(|err| {
                if err.is_transport() {
                    warn!("command queue unreachable: {err:#}");
                } else {
                    warn!("error fetching commands: {err:#}");
                }
                Vec::new()
            })
    }

    pub fn execute_command(&mut self, command: &Command) -> bool {
        info!("executing command {}: {}", command.id, command.command_type);
        self.state.execute(&command.kind())
    }

    pub async fn update_command_status(&self, id: &CommandId, status: CommandStatus) -> bool {
        let update = StatusUpdate::new(status, Utc::now());
        match self.backend.update_command_status(id, &update).await {
            Ok(()) => {
                info!("command {id} marked as {status}");
                true
            }
            Err(err) => {
                match err.status() {
                    Some(code) => warn!("command {id} update rejected with {code}: {err:#}"),
                    None => warn!("error updating command {id}: {err:#}"),
                }
                false
            }
        }
    }

    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let mut report = CycleReport::default();

        info!("reading sensors");
        for reading in self.read_sensors() {
            if self.send_sensor_data(&reading).await {
                report.readings_sent += 1;
            } else {
                report.readings_dropped += 1;
            }
        }

        info!("checking for commands");
        let rows = self.fetch_pending_commands().await;
        if rows.is_empty() {
            info!("no pending commands");
        } else {
            info!("found {} pending command(s)", rows.len());
        }

        for (index, row) in rows.iter().enumerate() {
            let command = row
                .decode()
                .map_err(|source| CycleError::MalformedCommand { index, source })?;

            if let Some(status) = command.status.filter(|s| s.is_terminal()) {
                warn!("skipping command {} already in status {status}", command.id);
                report.skipped += 1;
                continue;
            }

            let status = CommandStatus::from_outcome(self.execute_command(&command));
            if !self.update_command_status(&command.id, status).await {
                report.status_write_failed += 1;
            }

            match status {
                CommandStatus::Acknowledged => report.acknowledged += 1,
                _ => report.failed += 1,
            }
        }

        info!("cycle complete, heating: {}", self.state.heating_label());
        Ok(report)
    }
}
