use super::{StateDecode, SubPackageType};
use crate::cursor::FieldCursor;
use crate::error::DecodeError;
use serde::Serialize;

/// TCP pose in base frame and the configured TCP offset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartesianInfo {
    /// [x, y, z, rx, ry, rz] in meters and radians
    pub tcp_pose: [f64; 6],
    pub tcp_offset: [f64; 6],
}

impl StateDecode for CartesianInfo {
    const TYPE: SubPackageType = SubPackageType::CartesianInfo;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            tcp_pose: cursor.f64x6()?,
            tcp_offset: cursor.f64x6()?,
        })
    }
}

/// Denavit-Hartenberg parameters and calibration checksums
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KinematicsInfo {
    pub checksum: [u32; 6],
    pub dh_theta: [f64; 6],
    pub dh_a: [f64; 6],
    pub dh_d: [f64; 6],
    pub dh_alpha: [f64; 6],
    pub calibration_status: u32,
}

impl StateDecode for KinematicsInfo {
    const TYPE: SubPackageType = SubPackageType::KinematicsInfo;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        let mut checksum = [0u32; 6];
        for value in checksum.iter_mut() {
            *value = cursor.u32()?;
        }
        Ok(Self {
            checksum,
            dh_theta: cursor.f64x6()?,
            dh_a: cursor.f64x6()?,
            dh_d: cursor.f64x6()?,
            dh_alpha: cursor.f64x6()?,
            calibration_status: cursor.u32()?,
        })
    }
}

/// Position limit of one joint
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JointLimits {
    pub min: f64,
    pub max: f64,
}

/// Speed and acceleration limit of one joint
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JointMotionLimits {
    pub max_speed: f64,
    pub max_acceleration: f64,
}

/// Static robot configuration, sent once after connect and on change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationData {
    pub joint_limits: [JointLimits; 6],
    pub joint_motion_limits: [JointMotionLimits; 6],
    pub v_joint_default: f64,
    pub a_joint_default: f64,
    pub v_tool_default: f64,
    pub a_tool_default: f64,
    pub eq_radius: f64,
    pub dh_a: [f64; 6],
    pub dh_d: [f64; 6],
    pub dh_alpha: [f64; 6],
    pub dh_theta: [f64; 6],
    pub masterboard_version: i32,
    pub controller_box_type: i32,
    pub robot_type: i32,
    pub robot_sub_type: i32,
}

impl StateDecode for ConfigurationData {
    const TYPE: SubPackageType = SubPackageType::ConfigurationData;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        let mut joint_limits = [JointLimits::default(); 6];
        for limits in joint_limits.iter_mut() {
            limits.min = cursor.f64()?;
            limits.max = cursor.f64()?;
        }
        let mut joint_motion_limits = [JointMotionLimits::default(); 6];
        for limits in joint_motion_limits.iter_mut() {
            limits.max_speed = cursor.f64()?;
            limits.max_acceleration = cursor.f64()?;
        }
        Ok(Self {
            joint_limits,
            joint_motion_limits,
            v_joint_default: cursor.f64()?,
            a_joint_default: cursor.f64()?,
            v_tool_default: cursor.f64()?,
            a_tool_default: cursor.f64()?,
            eq_radius: cursor.f64()?,
            dh_a: cursor.f64x6()?,
            dh_d: cursor.f64x6()?,
            dh_alpha: cursor.f64x6()?,
            dh_theta: cursor.f64x6()?,
            masterboard_version: cursor.i32()?,
            controller_box_type: cursor.i32()?,
            robot_type: cursor.i32()?,
            robot_sub_type: cursor.i32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForceModeData {
    /// [fx, fy, fz, frx, fry, frz]
    pub wrench: [f64; 6],
    pub robot_dexterity: f64,
}

impl StateDecode for ForceModeData {
    const TYPE: SubPackageType = SubPackageType::ForceModeData;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            wrench: cursor.f64x6()?,
            robot_dexterity: cursor.f64()?,
        })
    }
}
