use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommandId(pub String);

// Queue tables may key rows by text/uuid or by bigint.
impl<'de> Deserialize<'de> for CommandId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Number(number) => Self(number.to_string()),
        })
    }
}

impl CommandId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CommandId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a queued command. Only `Acknowledged` and `Failed` are
/// terminal; the controller never writes `Sent`, it only exists in the
/// backend schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Pending,
    Sent,
    Acknowledged,
    Failed,
}

impl CommandStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Acknowledged => "acknowledged",
            Self::Failed => "failed",
        }
    }

    pub fn from_outcome(applied: bool) -> Self {
        if applied {
            Self::Acknowledged
        } else {
            Self::Failed
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Acknowledged | Self::Failed)
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queue row. Only `id` and `command_type` are required; every other
/// column is read leniently so an odd row cannot wedge the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    #[serde(deserialize_with = "any_as_text")]
    pub command_type: String,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub parameters: Map<String, Value>,
    /// `None` when the column is absent or holds an unrecognized value.
    #[serde(default, deserialize_with = "known_status")]
    pub status: Option<CommandStatus>,
    #[serde(default, deserialize_with = "any_as_optional_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "any_as_optional_text")]
    pub executed_at: Option<String>,
}

impl Command {
    pub fn kind(&self) -> ControllerCommand {
        ControllerCommand::from_parts(&self.command_type, &self.parameters)
    }
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn any_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(text_of(Value::deserialize(deserializer)?).unwrap_or_else(|| "null".to_string()))
}

fn any_as_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(text_of(Value::deserialize(deserializer)?))
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

fn known_status<'de, D>(deserializer: D) -> Result<Option<CommandStatus>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let status = match Value::deserialize(deserializer)? {
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(CommandStatus::Pending),
            "sent" => Some(CommandStatus::Sent),
            "acknowledged" => Some(CommandStatus::Acknowledged),
            "failed" => Some(CommandStatus::Failed),
            _ => None,
        },
        _ => None,
    };
    Ok(status)
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("malformed command row")]
    Malformed(#[from] serde_json::Error),
}

/// A command-queue row exactly as the backend returned it. Decoding is
/// deferred so one bad row surfaces as a cycle error instead of hiding the
/// whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandRow(pub Value);

impl CommandRow {
    pub fn decode(&self) -> Result<Command, CommandError> {
        Ok(Command::deserialize(&self.0)?)
    }
}

impl From<Value> for CommandRow {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerCommand {
    EnableHeating,
    DisableHeating,
    SetRoomTemperature {
        room_id: Option<String>,
        temperature: Option<f64>,
    },
    Unknown(String),
}

impl ControllerCommand {
    pub fn from_parts(command_type: &str, parameters: &Map<String, Value>) -> Self {
        match command_type {
            "enable_heating" => Self::EnableHeating,
            "disable_heating" => Self::DisableHeating,
            "set_room_temperature" => Self::SetRoomTemperature {
                room_id: parameters.get("room_id").and_then(value_as_string),
                temperature: parameters.get("temperature").and_then(value_as_f64),
            },
            other => Self::Unknown(other.to_string()),
        }
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// PATCH body written back to the command queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub status: CommandStatus,
    pub executed_at: DateTime<Utc>,
}

impl StatusUpdate {
    pub fn new(status: CommandStatus, executed_at: DateTime<Utc>) -> Self {
        Self {
            status,
            executed_at,
        }
    }
}
