//! Frame-level dispatch on message type

use crate::error::{DecodeError, FramingError};
use crate::frame::{Frame, MessageType};
use crate::message::{decode_robot_message, RobotMessage};
use crate::state::{decode_robot_state, StatePackage};
use serde::Serialize;
use tracing::{trace, warn};

/// One decoded unit handed to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DecodedRecord {
    State(StatePackage),
    Message(RobotMessage),
}

/// Everything taken from one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    pub message_type: MessageType,
    pub records: Vec<DecodedRecord>,
    /// Sub-packages or messages dropped because they failed to decode
    pub failures: Vec<DecodeError>,
    /// Sub-package codes without a decoder
    pub skipped: Vec<u8>,
}

impl DecodedFrame {
    fn empty(message_type: MessageType) -> Self {
        Self {
            message_type,
            records: Vec::new(),
            failures: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

type FrameHandler = fn(&[u8]) -> Result<DecodedFrame, FramingError>;

fn handle_robot_state(payload: &[u8]) -> Result<DecodedFrame, FramingError> {
    let state = decode_robot_state(payload)?;
    let mut frame = DecodedFrame::empty(MessageType::RobotState);
    frame.records = state.packages.into_iter().map(DecodedRecord::State).collect();
    frame.failures = state.failures.into_iter().map(|failure| failure.error).collect();
    frame.skipped = state.skipped;
    Ok(frame)
}

fn handle_robot_message(payload: &[u8]) -> Result<DecodedFrame, FramingError> {
    let mut frame = DecodedFrame::empty(MessageType::RobotMessage);
    match decode_robot_message(payload) {
        Ok(message) => frame.records.push(DecodedRecord::Message(message)),
        Err(error) => {
            warn!("Failed to decode robot message: {}", error);
            frame.failures.push(error);
        }
    }
    Ok(frame)
}

/// Message types with a decoder. The rest are valid but opaque.
static FRAME_HANDLERS: [(MessageType, FrameHandler); 2] = [
    (MessageType::RobotState, handle_robot_state),
    (MessageType::RobotMessage, handle_robot_message),
];

/// Decode one frame. Only a `FramingError` is fatal; everything local is
/// collected in the returned `DecodedFrame`.
pub fn decode_frame(frame: &Frame) -> Result<DecodedFrame, FramingError> {
    match FRAME_HANDLERS
        .iter()
        .find(|(kind, _)| *kind == frame.message_type)
    {
        Some((_, handle)) => handle(&frame.payload),
        None => {
            trace!(
                "Ignoring {} message ({} bytes)",
                frame.message_type,
                frame.payload.len()
            );
            Ok(DecodedFrame::empty(frame.message_type))
        }
    }
}
