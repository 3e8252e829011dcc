use super::{StateDecode, SubPackageType};
use crate::cursor::{FieldCursor, FieldWriter};
use crate::error::DecodeError;
use crate::modes::{ControlMode, RobotMode};
use serde::Serialize;

/// Controller mode flags and speed settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotModeData {
    /// Controller time in milliseconds
    pub timestamp: u64,
    pub is_real_robot_connected: bool,
    pub is_real_robot_enabled: bool,
    pub is_robot_power_on: bool,
    pub is_emergency_stopped: bool,
    pub is_protective_stopped: bool,
    pub is_program_running: bool,
    pub is_program_paused: bool,
    pub robot_mode: RobotMode,
    pub control_mode: ControlMode,
    pub target_speed_fraction: f64,
    pub speed_scaling: f64,
    pub target_speed_fraction_limit: f64,
}

impl StateDecode for RobotModeData {
    const TYPE: SubPackageType = SubPackageType::RobotModeData;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            timestamp: cursor.u64()?,
            is_real_robot_connected: cursor.bool()?,
            is_real_robot_enabled: cursor.bool()?,
            is_robot_power_on: cursor.bool()?,
            is_emergency_stopped: cursor.bool()?,
            is_protective_stopped: cursor.bool()?,
            is_program_running: cursor.bool()?,
            is_program_paused: cursor.bool()?,
            robot_mode: RobotMode::from_code(cursor.i8()?),
            control_mode: ControlMode::from_code(cursor.u8()?),
            target_speed_fraction: cursor.f64()?,
            speed_scaling: cursor.f64()?,
            target_speed_fraction_limit: cursor.f64()?,
        })
    }
}

impl RobotModeData {
    /// Sub-package body in wire layout
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = FieldWriter::new();
        writer
            .u64(self.timestamp)
            .bool(self.is_real_robot_connected)
            .bool(self.is_real_robot_enabled)
            .bool(self.is_robot_power_on)
            .bool(self.is_emergency_stopped)
            .bool(self.is_protective_stopped)
            .bool(self.is_program_running)
            .bool(self.is_program_paused)
            .i8(self.robot_mode.code())
            .u8(self.control_mode.code())
            .f64(self.target_speed_fraction)
            .f64(self.speed_scaling)
            .f64(self.target_speed_fraction_limit);
        writer.into_bytes()
    }
}
