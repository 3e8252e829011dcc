use super::{StateDecode, SubPackageType};
use crate::cursor::FieldCursor;
use crate::error::DecodeError;
use serde::Serialize;

/// Freedrive button state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalInfo {
    pub tp_button_state: u8,
    pub freedrive_button_enabled: bool,
    pub io_enabled_freedrive: bool,
}

impl StateDecode for AdditionalInfo {
    const TYPE: SubPackageType = SubPackageType::AdditionalInfo;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            tp_button_state: cursor.u8()?,
            freedrive_button_enabled: cursor.bool()?,
            io_enabled_freedrive: cursor.bool()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingularityInfo {
    pub severity: u8,
    pub singularity_type: u8,
}

impl StateDecode for SingularityInfo {
    const TYPE: SubPackageType = SubPackageType::SingularityInfo;

    fn decode(cursor: &mut FieldCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            severity: cursor.u8()?,
            singularity_type: cursor.u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_additional_info() {
        // trailing reserved byte sent by e-Series controllers
        let data = AdditionalInfo::decode(&mut FieldCursor::new(&[1, 0, 2, 0])).unwrap();
        assert_eq!(data.tp_button_state, 1);
        assert!(!data.freedrive_button_enabled);
        assert!(data.io_enabled_freedrive);
    }

    #[test]
    fn test_decode_singularity_info() {
        let data = SingularityInfo::decode(&mut FieldCursor::new(&[2, 1])).unwrap();
        assert_eq!(data.severity, 2);
        assert_eq!(data.singularity_type, 1);
        assert!(SingularityInfo::decode(&mut FieldCursor::new(&[2])).is_err());
    }
}
