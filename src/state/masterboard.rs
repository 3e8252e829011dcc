use super::{StateDecode, SubPackageType};
use crate::cursor::FieldCursor;
use crate::error::DecodeError;
use crate::modes::SafetyMode;
use serde::Serialize;

/// Euromap67 interface block, present only when the interface is installed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EuromapData {
    pub input_bits: u32,
    pub output_bits: u32,
    pub voltage_24v: f32,
    pub current: f32,
}

/// Control box I/O, power and safety state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterboardData {
    pub digital_input_bits: u32,
    pub digital_output_bits: u32,
    pub analog_input_range0: u8,
    pub analog_input_range1: u8,
    pub analog_input0: f64,
    pub analog_input1: f64,
    pub analog_output_domain0: u8,
    pub analog_output_domain1: u8,
    pub analog_output0: f64,
    pub analog_output1: f64,
    pub masterboard_temperature: f32,
    pub robot_voltage_48v: f32,
    pub robot_current: f32,
    pub master_io_current: f32,
    pub safety_mode: SafetyMode,
    pub in_reduced_mode: u8,
    pub euromap: Option<EuromapData>,
    /// e-Series only
    pub operational_mode_selector_input: Option<u8>,
    /// e-Series only
    pub three_position_enabling_device_input: Option<u8>,
}

/// Reserved u32 followed by the two e-Series selector inputs
const E_SERIES_TAIL_LEN: usize = 6;

impl StateDecode for MasterboardData {
    const TYPE: SubPackageType = SubPackageType::MasterboardData;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        let digital_input_bits = cursor.u32()?;
        let digital_output_bits = cursor.u32()?;
        let analog_input_range0 = cursor.u8()?;
        let analog_input_range1 = cursor.u8()?;
        let analog_input0 = cursor.f64()?;
        let analog_input1 = cursor.f64()?;
        let analog_output_domain0 = cursor.u8()?;
        let analog_output_domain1 = cursor.u8()?;
        let analog_output0 = cursor.f64()?;
        let analog_output1 = cursor.f64()?;
        let masterboard_temperature = cursor.f32()?;
        let robot_voltage_48v = cursor.f32()?;
        let robot_current = cursor.f32()?;
        let master_io_current = cursor.f32()?;
        let safety_mode = SafetyMode::from_code(cursor.u8()?);
        let in_reduced_mode = cursor.u8()?;

        let euromap = if cursor.bool()? {
            Some(EuromapData {
                input_bits: cursor.u32()?,
                output_bits: cursor.u32()?,
                voltage_24v: cursor.f32()?,
                current: cursor.f32()?,
            })
        } else {
            None
        };

        let (operational_mode_selector_input, three_position_enabling_device_input) =
            if cursor.remaining() >= E_SERIES_TAIL_LEN {
                cursor.u32()?;
                (Some(cursor.u8()?), Some(cursor.u8()?))
            } else {
                (None, None)
            };

        Ok(Self {
            digital_input_bits,
            digital_output_bits,
            analog_input_range0,
            analog_input_range1,
            analog_input0,
            analog_input1,
            analog_output_domain0,
            analog_output_domain1,
            analog_output0,
            analog_output1,
            masterboard_temperature,
            robot_voltage_48v,
            robot_current,
            master_io_current,
            safety_mode,
            in_reduced_mode,
            euromap,
            operational_mode_selector_input,
            three_position_enabling_device_input,
        })
    }
}
