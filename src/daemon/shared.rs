//! Shared types for daemon communication
//!
//! This module contains the wire types exchanged between the daemon's IPC
//! server and its clients.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::panel::{BridgeEvent, MethodCall};

/// IPC message types for daemon communication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DaemonMessage {
    /// Named command for the command bridge
    Invoke(MethodCall),
    /// Attach this connection as the event listener
    Subscribe,
    /// Simulated user activation of the panel control
    Wake,
    Status,
    Ping,
    Shutdown,
}

/// Daemon response types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DaemonResponse {
    Ok,
    Error(ErrorReply),
    Status(PanelStatus),
    Subscribed { listener_id: u64 },
    Event(BridgeEvent),
    Woke { delivered: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidArgument,
    Surface,
    Internal,
}

/// Failure reply for a command
///
/// `subject` is the offending argument for `InvalidArgument` and the failed
/// platform operation for `Surface`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub code: ErrorCode,
    pub subject: Option<String>,
    pub message: String,
}

impl From<&AppError> for ErrorReply {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::InvalidArgument { argument, reason } => ErrorReply {
                code: ErrorCode::InvalidArgument,
                subject: Some(argument.clone()),
                message: reason.clone(),
            },
            AppError::Surface { operation, message, .. } => ErrorReply {
                code: ErrorCode::Surface,
                subject: Some(operation.clone()),
                message: message.clone(),
            },
            other => ErrorReply {
                code: ErrorCode::Internal,
                subject: None,
                message: other.to_string(),
            },
        }
    }
}

impl From<ErrorReply> for AppError {
    fn from(reply: ErrorReply) -> Self {
        match reply.code {
            ErrorCode::InvalidArgument => AppError::invalid_argument(
                reply.subject.unwrap_or_else(|| "payload".to_string()),
                reply.message,
            ),
            ErrorCode::Surface => AppError::surface(
                reply.subject.unwrap_or_else(|| "unknown".to_string()),
                reply.message,
            ),
            ErrorCode::Internal => AppError::daemon(reply.message),
        }
    }
}

/// Daemon and panel state reported by `Status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelStatus {
    pub visible: bool,
    pub title: Option<String>,
    pub shown_at: Option<DateTime<Local>>,
    pub channel_registered: bool,
    pub listener_attached: bool,
    pub events_delivered: u64,
    pub events_dropped: u64,
    pub surface: String,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_survives_the_wire() {
        let original = AppError::invalid_argument("content", "missing payload");
        let reply = ErrorReply::from(&original);
        assert_eq!(reply.code, ErrorCode::InvalidArgument);

        let bytes = bincode::serde::encode_to_vec(
            &DaemonResponse::Error(reply),
            bincode::config::standard(),
        )
        .unwrap();
        let (decoded, _): (DaemonResponse, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();

        match decoded {
            DaemonResponse::Error(reply) => {
                let err = AppError::from(reply);
                assert_eq!(err.to_string(), original.to_string());
            }
            other => panic!("Expected Error response, got {:?}", other),
        }
    }

    #[test]
    fn test_other_errors_become_internal() {
        let reply = ErrorReply::from(&AppError::config("broken"));
        assert_eq!(reply.code, ErrorCode::Internal);
        assert!(reply.subject.is_none());
    }
}
