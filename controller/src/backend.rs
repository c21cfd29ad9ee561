use home_common::{CommandId, CommandRow, SensorReading, StatusUpdate};

use crate::error::ApiError;

/// Remote side of the controller: the ingestion endpoint and the
/// command-queue resource.
pub trait ControllerBackend {
    async fn send_reading(&self, reading: &SensorReading) -> Result<(), ApiError>;

    /// Pending rows ordered by creation time, oldest first.
    async fn fetch_pending_commands(&self) -> Result<Vec<CommandRow>, ApiError>;

    async fn update_command_status(
        &self,
        id: &CommandId,
        update: &StatusUpdate,
    ) -> Result<(), ApiError>;
}
