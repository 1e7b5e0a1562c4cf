//! Types for the world generation orchestrator.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::marble::{OperationId, OperationSnapshot};
use crate::world::World;

/// Errors that can end a generation run.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service answered with an unexpected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The signed-URL upload was rejected.
    #[error("upload failed: {status} - {message}")]
    Transfer { status: u16, message: String },

    /// The job finished with an error. The payload is kept verbatim.
    #[error("generation failed: {error}")]
    RemoteJob { error: Value },

    /// No terminal state before the deadline.
    #[error("world generation timed out after {max_wait:?} (operation {operation_id})")]
    Timeout {
        operation_id: String,
        max_wait: Duration,
    },

    /// Missing credential or invalid input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A control-plane endpoint returned a non-success status.
    #[error("{endpoint} request failed: {status} - {message}")]
    Api {
        endpoint: &'static str,
        status: u16,
        message: String,
    },

    /// Transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl GenerationError {
    /// Short label for metrics and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Protocol(_) => "protocol",
            GenerationError::Transfer { .. } => "transfer",
            GenerationError::RemoteJob { .. } => "remote_job",
            GenerationError::Timeout { .. } => "timeout",
            GenerationError::Configuration(_) => "configuration",
            GenerationError::Api { .. } => "api",
            GenerationError::Http(_) => "http",
        }
    }
}

/// Where a job stands after one status snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationState {
    Pending { progress: Option<f64> },
    DoneOk(World),
    DoneError(Value),
}

impl OperationState {
    /// Classify a snapshot.
    ///
    /// A non-empty error wins over any result. A finished job without error
    /// must carry a result; one that does not is a protocol error.
    pub fn from_snapshot(snapshot: OperationSnapshot) -> Result<Self, GenerationError> {
        if !snapshot.done {
            return Ok(OperationState::Pending {
                progress: snapshot.progress_percent(),
            });
        }

        if let Some(error) = snapshot.error.filter(is_present) {
            return Ok(OperationState::DoneError(error));
        }

        match snapshot.response {
            Some(payload) if !payload.is_null() => Ok(OperationState::DoneOk(World::new(payload))),
            _ => Err(GenerationError::Protocol(
                "operation done but no result received".to_string(),
            )),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationState::Pending { .. })
    }
}

/// Null, false, zero and empty strings/arrays/objects count as "no error".
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Side-channel notifications from a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GenerationEvent {
    UploadPrepared { media_asset_id: String },
    Uploaded { bytes: usize },
    Submitted { operation_id: String },
    Progress { percent: f64 },
    Waiting { elapsed_secs: u64 },
    Completed { operation_id: String, polls: u32 },
}

/// Observer callback; invoked synchronously from the run.
pub type GenerationObserver = Arc<dyn Fn(&GenerationEvent) + Send + Sync>;

/// A finished run.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub operation_id: OperationId,
    pub world: World,
    /// Status requests issued.
    pub polls: u32,
    /// Time spent in the poll loop.
    pub elapsed: Duration,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> OperationSnapshot {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_pending_carries_progress() {
        let state =
            OperationState::from_snapshot(snapshot(json!({"done": false, "progress": 30})))
                .unwrap();
        assert_eq!(state, OperationState::Pending { progress: Some(30.0) });
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_done_ok() {
        let state = OperationState::from_snapshot(snapshot(
            json!({"done": true, "response": {"world_id": "w"}}),
        ))
        .unwrap();
        assert_eq!(state, OperationState::DoneOk(World::new(json!({"world_id": "w"}))));
        assert!(state.is_terminal());
    }

    #[test]
    fn test_error_wins_over_result() {
        let state = OperationState::from_snapshot(snapshot(json!({
            "done": true,
            "error": {"code": 13, "message": "boom"},
            "response": {"world_id": "w"}
        })))
        .unwrap();
        assert_eq!(
            state,
            OperationState::DoneError(json!({"code": 13, "message": "boom"}))
        );
    }

    #[test]
    fn test_empty_error_is_ignored() {
        for empty in [json!(null), json!(""), json!({}), json!([]), json!(false)] {
            let state = OperationState::from_snapshot(snapshot(json!({
                "done": true,
                "error": empty,
                "response": {"world_id": "w"}
            })))
            .unwrap();
            assert!(matches!(state, OperationState::DoneOk(_)));
        }
    }

    #[test]
    fn test_done_without_result_is_protocol_error() {
        let err = OperationState::from_snapshot(snapshot(json!({"done": true}))).unwrap_err();
        assert!(matches!(err, GenerationError::Protocol(_)));

        let err =
            OperationState::from_snapshot(snapshot(json!({"done": true, "response": null})))
                .unwrap_err();
        assert!(matches!(err, GenerationError::Protocol(_)));
    }

    #[test]
    fn test_error_display_and_kind() {
        let err = GenerationError::RemoteJob {
            error: json!("quota exceeded"),
        };
        assert_eq!(err.to_string(), "generation failed: \"quota exceeded\"");
        assert_eq!(err.kind(), "remote_job");

        let err = GenerationError::Transfer {
            status: 403,
            message: "denied".to_string(),
        };
        assert_eq!(err.to_string(), "upload failed: 403 - denied");
        assert_eq!(err.kind(), "transfer");
    }

    #[test]
    fn test_event_serialization() {
        let event = GenerationEvent::Progress { percent: 50.0 };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "progress", "percent": 50.0})
        );
    }
}
