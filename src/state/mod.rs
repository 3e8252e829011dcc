//! Robot state sub-packages
//!
//! A `ROBOT_STATE` payload is a run of sub-packages, each with its own
//! u32 length (sub-header included) and u8 type. The declared length is
//! authoritative: the walk always advances by it, whatever the variant
//! decoder consumed. Unknown types are skipped, a variant that fails to
//! decode is recorded and skipped, and only an inconsistent length aborts
//! the frame.

mod info;
mod joint;
mod kinematics;
mod masterboard;
mod robot_mode;
mod tool;

pub use info::{AdditionalInfo, SingularityInfo};
pub use joint::{JointData, JointState};
pub use kinematics::{
    CartesianInfo, ConfigurationData, ForceModeData, JointLimits, JointMotionLimits, KinematicsInfo,
};
pub use masterboard::{EuromapData, MasterboardData};
pub use robot_mode::RobotModeData;
pub use tool::{ToolCommInfo, ToolData, ToolModeInfo};

use crate::cursor::{FieldCursor, FieldWriter};
use crate::error::{DecodeError, FramingError};
use crate::frame::HEADER_LEN;
use crate::modes::code_enum;
use serde::Serialize;
use tracing::{trace, warn};

code_enum! {
    /// Sub-package types inside a `ROBOT_STATE` message
    SubPackageType(u8) {
        RobotModeData = 0 => "ROBOT_MODE_DATA",
        JointData = 1 => "JOINT_DATA",
        ToolData = 2 => "TOOL_DATA",
        MasterboardData = 3 => "MASTERBOARD_DATA",
        CartesianInfo = 4 => "CARTESIAN_INFO",
        KinematicsInfo = 5 => "KINEMATICS_INFO",
        ConfigurationData = 6 => "CONFIGURATION_DATA",
        ForceModeData = 7 => "FORCE_MODE_DATA",
        AdditionalInfo = 8 => "ADDITIONAL_INFO",
        ToolCommInfo = 11 => "TOOL_COMM_INFO",
        ToolModeInfo = 12 => "TOOL_MODE_INFO",
        SingularityInfo = 13 => "SINGULARITY_INFO",
    }
}

/// A fully decoded sub-package
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatePackage {
    RobotModeData(RobotModeData),
    JointData(JointData),
    ToolData(ToolData),
    MasterboardData(MasterboardData),
    CartesianInfo(CartesianInfo),
    KinematicsInfo(KinematicsInfo),
    ConfigurationData(ConfigurationData),
    ForceModeData(ForceModeData),
    AdditionalInfo(AdditionalInfo),
    ToolCommInfo(ToolCommInfo),
    ToolModeInfo(ToolModeInfo),
    SingularityInfo(SingularityInfo),
}

impl StatePackage {
    pub fn kind(&self) -> SubPackageType {
        match self {
            StatePackage::RobotModeData(_) => SubPackageType::RobotModeData,
            StatePackage::JointData(_) => SubPackageType::JointData,
            StatePackage::ToolData(_) => SubPackageType::ToolData,
            StatePackage::MasterboardData(_) => SubPackageType::MasterboardData,
            StatePackage::CartesianInfo(_) => SubPackageType::CartesianInfo,
            StatePackage::KinematicsInfo(_) => SubPackageType::KinematicsInfo,
            StatePackage::ConfigurationData(_) => SubPackageType::ConfigurationData,
            StatePackage::ForceModeData(_) => SubPackageType::ForceModeData,
            StatePackage::AdditionalInfo(_) => SubPackageType::AdditionalInfo,
            StatePackage::ToolCommInfo(_) => SubPackageType::ToolCommInfo,
            StatePackage::ToolModeInfo(_) => SubPackageType::ToolModeInfo,
            StatePackage::SingularityInfo(_) => SubPackageType::SingularityInfo,
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),+ $(,)?) => {
        $(impl From<$variant> for StatePackage {
            fn from(data: $variant) -> Self {
                StatePackage::$variant(data)
            }
        })+
    };
}

impl_from_variant!(
    RobotModeData,
    JointData,
    ToolData,
    MasterboardData,
    CartesianInfo,
    KinematicsInfo,
    ConfigurationData,
    ForceModeData,
    AdditionalInfo,
    ToolCommInfo,
    ToolModeInfo,
    SingularityInfo,
);

/// Decoding of one sub-package body into its typed record
pub trait StateDecode: Sized + Into<StatePackage> {
    const TYPE: SubPackageType;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError>;
}

type StateDecodeFn = fn(&[u8]) -> Result<StatePackage, DecodeError>;

fn decode_into<T: StateDecode>(data: &[u8]) -> Result<StatePackage, DecodeError> {
    let mut cursor = FieldCursor::new(data);
    T::decode(&mut cursor).map(Into::into)
}

/// Registered decoders. Codes missing here are skipped.
static STATE_DECODERS: [(SubPackageType, StateDecodeFn); 12] = [
    (RobotModeData::TYPE, decode_into::<RobotModeData>),
    (JointData::TYPE, decode_into::<JointData>),
    (ToolData::TYPE, decode_into::<ToolData>),
    (MasterboardData::TYPE, decode_into::<MasterboardData>),
    (CartesianInfo::TYPE, decode_into::<CartesianInfo>),
    (KinematicsInfo::TYPE, decode_into::<KinematicsInfo>),
    (ConfigurationData::TYPE, decode_into::<ConfigurationData>),
    (ForceModeData::TYPE, decode_into::<ForceModeData>),
    (AdditionalInfo::TYPE, decode_into::<AdditionalInfo>),
    (ToolCommInfo::TYPE, decode_into::<ToolCommInfo>),
    (ToolModeInfo::TYPE, decode_into::<ToolModeInfo>),
    (SingularityInfo::TYPE, decode_into::<SingularityInfo>),
];

fn lookup(code: u8) -> Option<StateDecodeFn> {
    STATE_DECODERS
        .iter()
        .find(|(kind, _)| kind.code() == code)
        .map(|(_, decode)| *decode)
}

/// A registered sub-package whose body could not be decoded
#[derive(Debug, Clone, PartialEq)]
pub struct SubPackageFailure {
    pub kind: SubPackageType,
    /// Offset of the sub-header within the frame payload
    pub offset: usize,
    pub error: DecodeError,
}

/// Outcome of walking one `ROBOT_STATE` payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotStateFrame {
    /// Decoded sub-packages in arrival order
    pub packages: Vec<StatePackage>,
    /// Type codes with no registered decoder
    pub skipped: Vec<u8>,
    pub failures: Vec<SubPackageFailure>,
}

/// A partial sub-header overruns the payload like an oversized length does
fn sub_header(cursor: &mut FieldCursor<'_>) -> Result<(u32, u8), FramingError> {
    let offset = cursor.position();
    let remaining = cursor.remaining();
    let overrun = |declared| FramingError::SubPackageOverrun { offset, declared, remaining };
    let length = cursor.u32().map_err(|_| overrun(0))?;
    let code = cursor.u8().map_err(|_| overrun(length))?;
    Ok((length, code))
}

/// Walk the sub-packages of a `ROBOT_STATE` payload
pub fn decode_robot_state(payload: &[u8]) -> Result<RobotStateFrame, FramingError> {
    let mut cursor = FieldCursor::new(payload);
    let mut frame = RobotStateFrame::default();

    while !cursor.is_empty() {
        let offset = cursor.position();
        let (length, code) = sub_header(&mut cursor)?;
        if (length as usize) < HEADER_LEN {
            return Err(FramingError::SubPackageTooShort { offset, declared: length });
        }
        let overrun = FramingError::SubPackageOverrun {
            offset,
            declared: length,
            remaining: payload.len() - offset,
        };
        let body_len = length as usize - HEADER_LEN;
        if body_len > cursor.remaining() {
            return Err(overrun);
        }
        let body = cursor.bytes(body_len).map_err(|_| overrun)?;

        let Some(decode) = lookup(code) else {
            trace!("Skipping unknown sub-package type {} ({} bytes)", code, length);
            frame.skipped.push(code);
            continue;
        };
        match decode(body) {
            Ok(package) => frame.packages.push(package),
            Err(error) => {
                let kind = SubPackageType::from_code(code);
                warn!("Failed to decode {} at offset {}: {}", kind, offset, error);
                frame.failures.push(SubPackageFailure { kind, offset, error });
            }
        }
    }

    Ok(frame)
}

/// Wrap an encoded body in its sub-header
pub fn encode_sub_package(code: u8, body: &[u8]) -> Vec<u8> {
    let mut writer = FieldWriter::new();
    writer.u32((HEADER_LEN + body.len()) as u32).u8(code).bytes(body);
    writer.into_bytes()
}
