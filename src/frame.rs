//! Outer message envelope of the primary interface
//!
//! Every message starts with a big-endian u32 total length (header
//! included) followed by a one-byte message type.

use crate::cursor::{FieldCursor, FieldWriter};
use crate::error::FramingError;
use crate::modes::code_enum;
use tracing::trace;

/// Length field plus message type
pub const HEADER_LEN: usize = 5;

/// Default upper bound on a single frame
pub const DEFAULT_MAX_FRAME_LEN: usize = 65_536;

code_enum! {
    /// Top-level message types
    MessageType(u8) {
        ModbusInfo = 5 => "MODBUS_INFO",
        RobotState = 16 => "ROBOT_STATE",
        RobotMessage = 20 => "ROBOT_MESSAGE",
        HmcMessage = 22 => "HMC_MESSAGE",
        SafetySetupBroadcast = 23 => "SAFETY_SETUP_BROADCAST",
        SafetyComplianceTolerances = 24 => "SAFETY_COMPLIANCE_TOLERANCES",
        ProgramState = 25 => "PROGRAM_STATE",
        Disconnect = 255 => "DISCONNECT",
    }
}

/// One complete message taken off the wire
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub message_type: MessageType,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(message_type: MessageType, payload: Vec<u8>) -> Self {
        Self { message_type, payload }
    }

    /// Length as written in the header
    pub fn total_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = FieldWriter::new();
        writer
            .u32(self.total_len() as u32)
            .u8(self.message_type.code())
            .bytes(&self.payload);
        writer.into_bytes()
    }
}

/// Read the declared length without consuming anything.
/// `None` until the four length bytes are available.
fn peek_len(buf: &[u8]) -> Option<u32> {
    FieldCursor::new(buf).u32().ok()
}

/// Decode the frame at the start of `buf`.
///
/// The whole frame must be present; trailing bytes are ignored.
pub fn decode_one(buf: &[u8]) -> Result<Frame, FramingError> {
    if buf.len() < HEADER_LEN {
        return Err(FramingError::Truncated {
            needed: HEADER_LEN,
            available: buf.len(),
        });
    }
    let declared = peek_len(buf).unwrap_or_default();
    if (declared as usize) < HEADER_LEN {
        return Err(FramingError::HeaderTooShort { declared });
    }
    if buf.len() < declared as usize {
        return Err(FramingError::Truncated {
            needed: declared as usize,
            available: buf.len(),
        });
    }
    Ok(Frame {
        message_type: MessageType::from_code(buf[4]),
        payload: buf[HEADER_LEN..declared as usize].to_vec(),
    })
}

/// Reassembles frames from reads of arbitrary size
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    max_frame_len: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl FrameDecoder {
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            max_frame_len,
        }
    }

    /// Append freshly read bytes
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Bytes held for the next frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop partial data, e.g. after a reconnect
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Error for bytes left over once the source is exhausted, `None` on a
    /// frame boundary
    pub fn leftover(&self) -> Option<FramingError> {
        if self.buffer.is_empty() {
            return None;
        }
        let needed = peek_len(&self.buffer).map_or(HEADER_LEN, |declared| declared as usize);
        Some(FramingError::Truncated {
            needed: needed.max(HEADER_LEN),
            available: self.buffer.len(),
        })
    }

    /// Take the next complete frame, `Ok(None)` when more bytes are needed
    pub fn next_frame(&mut self) -> Result<Option<Frame>, FramingError> {
        let Some(declared) = peek_len(&self.buffer) else {
            return Ok(None);
        };
        if (declared as usize) < HEADER_LEN {
            return Err(FramingError::HeaderTooShort { declared });
        }
        if declared as usize > self.max_frame_len {
            return Err(FramingError::Oversized {
                declared,
                limit: self.max_frame_len,
            });
        }
        if self.buffer.len() < declared as usize {
            trace!(
                "Waiting for frame: {} of {} bytes buffered",
                self.buffer.len(),
                declared
            );
            return Ok(None);
        }

        let frame = decode_one(&self.buffer)?;
        self.buffer.drain(..declared as usize);
        Ok(Some(frame))
    }
}
