use super::{StateDecode, SubPackageType};
use crate::cursor::FieldCursor;
use crate::error::DecodeError;
use crate::modes::JointMode;
use serde::Serialize;

/// Feedback of a single joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointState {
    /// Actual position (rad)
    pub q_actual: f64,
    /// Target position (rad)
    pub q_target: f64,
    /// Actual speed (rad/s)
    pub qd_actual: f64,
    /// Motor current (A)
    pub i_actual: f32,
    /// Motor voltage (V)
    pub v_actual: f32,
    /// Motor temperature (°C)
    pub t_motor: f32,
    /// Micro controller temperature, deprecated by the controller
    pub t_micro: f32,
    pub joint_mode: JointMode,
}

impl JointState {
    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            q_actual: cursor.f64()?,
            q_target: cursor.f64()?,
            qd_actual: cursor.f64()?,
            i_actual: cursor.f32()?,
            v_actual: cursor.f32()?,
            t_motor: cursor.f32()?,
            t_micro: cursor.f32()?,
            joint_mode: JointMode::from_code(cursor.u8()?),
        })
    }
}

/// All six joints, base first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointData {
    pub joints: [JointState; 6],
}

impl JointData {
    pub fn positions(&self) -> [f64; 6] {
        self.joints.map(|joint| joint.q_actual)
    }
}

impl StateDecode for JointData {
    const TYPE: SubPackageType = SubPackageType::JointData;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            joints: [
                JointState::decode(cursor)?,
                JointState::decode(cursor)?,
                JointState::decode(cursor)?,
                JointState::decode(cursor)?,
                JointState::decode(cursor)?,
                JointState::decode(cursor)?,
            ],
        })
    }
}
