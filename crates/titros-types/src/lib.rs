use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identity of one live client connection.
///
/// Minted when the transport connection is accepted and destroyed when it
/// closes; a reconnecting client receives a fresh id. The `Display` form is
/// the first 8 hex digits, which is what appears in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = self.0.simple().to_string();
        write!(f, "{}", &full[..8])
    }
}

/// Strict definition of the actuation intents a dashboard client may request.
/// `titros-hal` translates these into pump pulse durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PumpCommand {
    /// One titration drop (500 ms pulse).
    #[serde(rename = "PUMP_500MS")]
    ShortPulse,
    /// Continuous flow burst (1000 ms pulse).
    #[serde(rename = "PUMP_1000MS")]
    LongPulse,
}

impl PumpCommand {
    /// How long the pump relay stays energised for this command.
    pub fn pulse_duration(&self) -> Duration {
        match self {
            PumpCommand::ShortPulse => Duration::from_millis(500),
            PumpCommand::LongPulse => Duration::from_millis(1000),
        }
    }

    /// The identifier the dashboard sends on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            PumpCommand::ShortPulse => "PUMP_500MS",
            PumpCommand::LongPulse => "PUMP_1000MS",
        }
    }
}

impl std::str::FromStr for PumpCommand {
    type Err = TitrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUMP_500MS" => Ok(PumpCommand::ShortPulse),
            "PUMP_1000MS" => Ok(PumpCommand::LongPulse),
            other => Err(TitrError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for PumpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Per-client view of the access queue, recomputed in full on every
/// membership change. `my_position` is the zero-based queue index; position 0
/// holds exclusive pump rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub my_position: usize,
    pub total_users: usize,
}

/// Server → client wire envelope: `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Pushed to every queue member after each join/leave.
    QueueStatus(QueueStatus),
    /// Raw transmittance reading, pushed to every connected client each tick.
    SensorData(u16),
}

/// Client → server wire envelope, same tagging as [`ServerEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A pump actuation request; payload is the raw command identifier,
    /// parsed with [`PumpCommand::from_str`].
    Command(String),
}

/// One timestamped sensor reading as produced by the telemetry loop.
///
/// Only the raw value crosses the wire; the timestamp is for logging and
/// consumers that keep their own bounded history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub value: u16,
    pub taken_at: DateTime<Utc>,
}

impl TelemetrySample {
    pub fn now(value: u16) -> Self {
        Self {
            value,
            taken_at: Utc::now(),
        }
    }
}

/// Why a pump command was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// Nobody is connected; there is no head to match against.
    EmptyQueue,
    /// The sender is connected but is not at the front of the queue.
    NotHead { head: SessionId },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::EmptyQueue => write!(f, "queue is empty"),
            DenyReason::NotHead { head } => write!(f, "head is {head}"),
        }
    }
}

/// Global error type spanning hardware faults, transport failures, and
/// authorization rejections.
#[derive(Error, Debug)]
pub enum TitrError {
    #[error("Command denied for {session}: {reason}")]
    CommandDenied {
        session: SessionId,
        reason: DenyReason,
    },

    #[error("Unknown command identifier: {0:?}")]
    UnknownCommand(String),

    #[error("Hardware fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Sensor fault: {0}")]
    SensorFault(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn pump_command_wire_roundtrip() {
        for cmd in [PumpCommand::ShortPulse, PumpCommand::LongPulse] {
            let parsed = PumpCommand::from_str(cmd.wire_name()).unwrap();
            assert_eq!(parsed, cmd);
        }
    }

    #[test]
    fn pump_command_unknown_identifier_is_rejected() {
        let err = PumpCommand::from_str("PUMP_FOREVER").unwrap_err();
        assert!(matches!(err, TitrError::UnknownCommand(_)));
    }

    #[test]
    fn pulse_durations_match_wire_names() {
        assert_eq!(
            PumpCommand::ShortPulse.pulse_duration(),
            Duration::from_millis(500)
        );
        assert_eq!(
            PumpCommand::LongPulse.pulse_duration(),
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn queue_status_serializes_camel_case() {
        let status = QueueStatus {
            my_position: 2,
            total_users: 5,
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"myPosition\":2"));
        assert!(json.contains("\"totalUsers\":5"));
    }

    #[test]
    fn server_event_queue_status_envelope() {
        let event = ServerEvent::QueueStatus(QueueStatus {
            my_position: 0,
            total_users: 3,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"queue_status\""));
        assert!(json.contains("\"myPosition\":0"));
    }

    #[test]
    fn server_event_sensor_data_envelope() {
        let event = ServerEvent::SensorData(712);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"sensor_data","data":712}"#);
    }

    #[test]
    fn client_message_command_roundtrip() {
        let raw = r#"{"event":"command","data":"PUMP_500MS"}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        let ClientMessage::Command(cmd) = msg;
        assert_eq!(PumpCommand::from_str(&cmd).unwrap(), PumpCommand::ShortPulse);
    }

    #[test]
    fn session_id_display_is_short() {
        let id = SessionId::new();
        assert_eq!(id.to_string().len(), 8);
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn titr_error_display() {
        let err = TitrError::HardwareFault {
            component: "pump".to_string(),
            details: "relay stuck".to_string(),
        };
        assert!(err.to_string().contains("pump"));

        let err2 = TitrError::CommandDenied {
            session: SessionId::new(),
            reason: DenyReason::EmptyQueue,
        };
        assert!(err2.to_string().contains("queue is empty"));
    }
}
