//! JSON line output for decoded records
//!
//! Every line is one object with an `stime` wall-clock stamp and a `type`
//! tag, so the stream can be consumed by external tools.

use crate::error::PrimaryError;
use crate::record::DecodedRecord;
use crate::snapshot::StateSnapshot;
use crate::stream::{StreamState, StreamStats};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp as f64 seconds since UNIX epoch with consistent precision
pub fn current_timestamp() -> f64 {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();

    // Round to 6 decimal places for consistent formatting
    (timestamp * 1_000_000.0).round() / 1_000_000.0
}

/// One decoded sub-package or robot message
#[derive(Debug, Serialize)]
pub struct RecordEvent<'a> {
    pub stime: f64,
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub data: &'a DecodedRecord,
}

impl<'a> RecordEvent<'a> {
    pub fn new(record: &'a DecodedRecord) -> Self {
        let event_type = match record {
            DecodedRecord::State(_) => "robot_state",
            DecodedRecord::Message(_) => "robot_message",
        };
        Self {
            stime: current_timestamp(),
            event_type,
            data: record,
        }
    }
}

/// Decode failure, local or fatal
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub stime: f64,
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub error: String,
    pub fatal: bool,
}

impl ErrorEvent {
    pub fn local(error: &impl std::fmt::Display) -> Self {
        Self {
            stime: current_timestamp(),
            event_type: "decode_error",
            error: error.to_string(),
            fatal: false,
        }
    }

    pub fn fatal(error: &PrimaryError) -> Self {
        Self {
            stime: current_timestamp(),
            event_type: "stream_error",
            error: error.to_string(),
            fatal: error.is_fatal(),
        }
    }
}

/// Connection state change with running counters
#[derive(Debug, Clone, Serialize)]
pub struct StreamEvent {
    pub stime: f64,
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub state: StreamState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StreamStats>,
}

impl StreamEvent {
    pub fn new(state: StreamState, stats: Option<StreamStats>) -> Self {
        Self {
            stime: current_timestamp(),
            event_type: "stream_state",
            state,
            stats,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SnapshotEvent<'a> {
    pub stime: f64,
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub data: &'a StateSnapshot,
}

impl<'a> SnapshotEvent<'a> {
    pub fn new(snapshot: &'a StateSnapshot) -> Self {
        Self {
            stime: current_timestamp(),
            event_type: "snapshot",
            data: snapshot,
        }
    }
}

/// Output a JSON event to stdout
pub fn output_event<T: Serialize>(event: &T) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{}", json);
    }
}

/// Convenience functions for outputting specific event types
pub mod output {
    use super::*;

    pub fn record(record: &DecodedRecord) {
        output_event(&RecordEvent::new(record));
    }

    pub fn decode_failure(error: &impl std::fmt::Display) {
        output_event(&ErrorEvent::local(error));
    }

    pub fn stream_error(error: &PrimaryError) {
        output_event(&ErrorEvent::fatal(error));
    }

    pub fn stream_state(state: StreamState, stats: Option<StreamStats>) {
        output_event(&StreamEvent::new(state, stats));
    }

    pub fn snapshot(snapshot: &StateSnapshot) {
        output_event(&SnapshotEvent::new(snapshot));
    }
}
