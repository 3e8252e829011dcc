//! `ROBOT_MESSAGE` decoding
//!
//! Every robot message starts with a timestamp, a source and a one-byte
//! subtype. Popup requests and keyed messages have registered layouts;
//! every other subtype is passed through with its raw bytes.

use crate::cursor::{FieldCursor, FieldWriter};
use crate::error::DecodeError;
use crate::modes::{code_enum, MessageSource, RequestValueType};
use serde::{Serialize, Serializer};

code_enum! {
    /// Robot message subtypes
    RobotMessageType(u8) {
        Text = 0 => "TEXT",
        Version = 3 => "VERSION",
        SafetyMode = 5 => "SAFETY_MODE",
        ErrorCode = 6 => "ERROR_CODE",
        Key = 7 => "KEY",
        PopupRequest = 9 => "POPUP_REQUEST",
        RuntimeException = 10 => "RUNTIME_EXCEPTION",
    }
}

fn serialize_code<const N: usize, S: Serializer>(
    code: &[u8; N],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(code))
}

/// Operator popup raised by a running program
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupMessage {
    pub request_id: u32,
    pub requested_type: RequestValueType,
    pub warning: bool,
    pub error: bool,
    pub blocking: bool,
    pub title: String,
    #[serde(serialize_with = "serialize_code")]
    pub text: [u8; 4],
}

impl PopupMessage {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            request_id: cursor.u32()?,
            requested_type: RequestValueType::from_code(cursor.u32()?),
            warning: cursor.bool()?,
            error: cursor.bool()?,
            blocking: cursor.bool()?,
            title: cursor.string()?,
            text: cursor.array()?,
        })
    }

    fn encode(&self, writer: &mut FieldWriter) {
        writer
            .u32(self.request_id)
            .u32(self.requested_type.code())
            .bool(self.warning)
            .bool(self.error)
            .bool(self.blocking)
            .string(&self.title)
            .bytes(&self.text);
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.text).into_owned()
    }
}

/// Coded controller notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedMessage {
    pub code: i32,
    pub argument: i32,
    pub title: String,
    #[serde(serialize_with = "serialize_code")]
    pub key_text: [u8; 8],
}

impl KeyedMessage {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            code: cursor.i32()?,
            argument: cursor.i32()?,
            title: cursor.string()?,
            key_text: cursor.array()?,
        })
    }

    fn encode(&self, writer: &mut FieldWriter) {
        writer
            .i32(self.code)
            .i32(self.argument)
            .string(&self.title)
            .bytes(&self.key_text);
    }

    pub fn key_text(&self) -> String {
        String::from_utf8_lossy(&self.key_text).into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RobotMessageBody {
    Popup(PopupMessage),
    Keyed(KeyedMessage),
    /// Subtype without a registered layout, bytes after the subtype byte
    Unparsed {
        message_type: RobotMessageType,
        data: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotMessage {
    pub timestamp: u64,
    pub source: MessageSource,
    pub body: RobotMessageBody,
}

impl RobotMessage {
    pub fn message_type(&self) -> RobotMessageType {
        match &self.body {
            RobotMessageBody::Popup(_) => RobotMessageType::PopupRequest,
            RobotMessageBody::Keyed(_) => RobotMessageType::Key,
            RobotMessageBody::Unparsed { message_type, .. } => *message_type,
        }
    }

    /// Frame payload in wire layout
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = FieldWriter::new();
        writer
            .u64(self.timestamp)
            .i8(self.source.code())
            .u8(self.message_type().code());
        match &self.body {
            RobotMessageBody::Popup(popup) => popup.encode(&mut writer),
            RobotMessageBody::Keyed(keyed) => keyed.encode(&mut writer),
            RobotMessageBody::Unparsed { data, .. } => {
                writer.bytes(data);
            }
        }
        writer.into_bytes()
    }
}

type MessageDecodeFn = fn(&mut FieldCursor<'_>) -> Result<RobotMessageBody, DecodeError>;

fn decode_popup(cursor: &mut FieldCursor<'_>) -> Result<RobotMessageBody, DecodeError> {
    PopupMessage::decode(cursor).map(RobotMessageBody::Popup)
}

fn decode_keyed(cursor: &mut FieldCursor<'_>) -> Result<RobotMessageBody, DecodeError> {
    KeyedMessage::decode(cursor).map(RobotMessageBody::Keyed)
}

/// Registered layouts. Other subtypes pass through unparsed.
static MESSAGE_DECODERS: [(RobotMessageType, MessageDecodeFn); 2] = [
    (RobotMessageType::PopupRequest, decode_popup),
    (RobotMessageType::Key, decode_keyed),
];

/// Decode the payload of a `ROBOT_MESSAGE` frame
pub fn decode_robot_message(payload: &[u8]) -> Result<RobotMessage, DecodeError> {
    let mut cursor = FieldCursor::new(payload);
    let timestamp = cursor.u64()?;
    let source = MessageSource::from_code(cursor.i8()?);
    let message_type = RobotMessageType::from_code(cursor.u8()?);

    let body = match MESSAGE_DECODERS.iter().find(|(kind, _)| *kind == message_type) {
        Some((_, decode)) => decode(&mut cursor)?,
        None => RobotMessageBody::Unparsed {
            message_type,
            data: cursor.rest().to_vec(),
        },
    };

    Ok(RobotMessage { timestamp, source, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn popup_payload() -> Vec<u8> {
        let mut writer = FieldWriter::new();
        writer
            .u64(5_000)
            .i8(-2)
            .u8(9)
            .u32(42)
            .u32(3)
            .bool(false)
            .bool(true)
            .bool(true)
            .u8(6)
            .bytes(b"Safety")
            .bytes(b"TEXT");
        writer.into_bytes()
    }

    #[test]
    fn test_decode_popup_request() {
        let payload = popup_payload();
        let message = decode_robot_message(&payload).unwrap();
        assert_eq!(message.timestamp, 5_000);
        assert_eq!(message.source, MessageSource::RobotInterface);
        assert_eq!(message.message_type(), RobotMessageType::PopupRequest);

        let RobotMessageBody::Popup(popup) = &message.body else {
            panic!("expected popup, got {:?}", message.body);
        };
        assert_eq!(popup.request_id, 42);
        assert_eq!(popup.requested_type, RequestValueType::Text);
        assert!(!popup.warning);
        assert!(popup.error);
        assert!(popup.blocking);
        assert_eq!(popup.title, "Safety");
        assert_eq!(popup.title.len(), 6);
        assert_eq!(&popup.text, b"TEXT");
        assert_eq!(popup.text(), "TEXT");

        assert_eq!(message.encode(), payload);
    }

    #[test]
    fn test_decode_keyed_message() {
        let mut writer = FieldWriter::new();
        writer
            .u64(77)
            .i8(7)
            .u8(7)
            .i32(-210)
            .i32(3)
            .string("Power")
            .bytes(b"C210A3\0\0");
        let payload = writer.into_bytes();

        let message = decode_robot_message(&payload).unwrap();
        assert_eq!(message.source, MessageSource::Controller);
        let RobotMessageBody::Keyed(keyed) = &message.body else {
            panic!("expected keyed message, got {:?}", message.body);
        };
        assert_eq!(keyed.code, -210);
        assert_eq!(keyed.argument, 3);
        assert_eq!(keyed.title, "Power");
        assert_eq!(&keyed.key_text, b"C210A3\0\0");

        assert_eq!(message.encode(), payload);
    }

    #[test]
    fn test_other_subtypes_pass_through() {
        let mut writer = FieldWriter::new();
        writer.u64(1).i8(-5).u8(3).bytes(&[1, 2, 3, 4]);
        let payload = writer.into_bytes();

        let message = decode_robot_message(&payload).unwrap();
        assert_eq!(
            message.body,
            RobotMessageBody::Unparsed {
                message_type: RobotMessageType::Version,
                data: vec![1, 2, 3, 4],
            }
        );
        assert_eq!(message.encode(), payload);
    }

    #[test]
    fn test_title_longer_than_payload_fails() {
        let mut payload = popup_payload();
        // title prefix sits after the 10-byte header and 11 popup bytes
        payload[21] = 60;
        assert!(matches!(
            decode_robot_message(&payload),
            Err(DecodeError::InsufficientBytes { needed: 60, .. })
        ));
    }

    #[test]
    fn test_short_header_fails() {
        assert!(decode_robot_message(&[0; 9]).is_err());
    }

    #[test]
    fn test_popup_serializes_text_codes() {
        let message = decode_robot_message(&popup_payload()).unwrap();
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["body"]["kind"], "popup");
        assert_eq!(json["body"]["text"], "TEXT");
        assert_eq!(json["body"]["requested_type"], "STRING");
        assert_eq!(json["source"], "ROBOTINTERFACE");
    }
}
