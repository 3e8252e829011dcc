use super::{StateDecode, SubPackageType};
use crate::cursor::FieldCursor;
use crate::error::DecodeError;
use crate::modes::ToolMode;
use serde::Serialize;

/// Tool flange I/O and power
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolData {
    pub analog_input_range0: u8,
    pub analog_input_range1: u8,
    pub analog_input0: f64,
    pub analog_input1: f64,
    pub tool_voltage_48v: f32,
    pub tool_output_voltage: u8,
    pub tool_current: f32,
    pub tool_temperature: f32,
    pub tool_mode: ToolMode,
}

impl StateDecode for ToolData {
    const TYPE: SubPackageType = SubPackageType::ToolData;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            analog_input_range0: cursor.u8()?,
            analog_input_range1: cursor.u8()?,
            analog_input0: cursor.f64()?,
            analog_input1: cursor.f64()?,
            tool_voltage_48v: cursor.f32()?,
            tool_output_voltage: cursor.u8()?,
            tool_current: cursor.f32()?,
            tool_temperature: cursor.f32()?,
            tool_mode: ToolMode::from_code(cursor.u8()?),
        })
    }
}

/// Serial settings of the tool communication interface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCommInfo {
    pub enabled: bool,
    pub baud_rate: i32,
    pub parity: i32,
    pub stop_bits: i32,
    pub rx_idle_chars: f32,
    pub tx_idle_chars: f32,
}

impl StateDecode for ToolCommInfo {
    const TYPE: SubPackageType = SubPackageType::ToolCommInfo;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            enabled: cursor.bool()?,
            baud_rate: cursor.i32()?,
            parity: cursor.i32()?,
            stop_bits: cursor.i32()?,
            rx_idle_chars: cursor.f32()?,
            tx_idle_chars: cursor.f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolModeInfo {
    pub output_mode: u8,
    pub digital_output_mode0: u8,
    pub digital_output_mode1: u8,
}

impl StateDecode for ToolModeInfo {
    const TYPE: SubPackageType = SubPackageType::ToolModeInfo;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            output_mode: cursor.u8()?,
            digital_output_mode0: cursor.u8()?,
            digital_output_mode1: cursor.u8()?,
        })
    }
}
