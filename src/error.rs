//! Error types for primary interface decoding and connections

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrimaryError>;

/// Envelope-level inconsistency. Byte positions can no longer be trusted,
/// so the stream has to be torn down and re-established.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("Frame header declares {declared} bytes, below the 5-byte minimum")]
    HeaderTooShort { declared: u32 },

    #[error("Frame truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Frame of {declared} bytes exceeds the {limit}-byte limit")]
    Oversized { declared: u32, limit: usize },

    #[error("Sub-package at offset {offset} declares {declared} bytes, below the 5-byte minimum")]
    SubPackageTooShort { offset: usize, declared: u32 },

    #[error("Sub-package at offset {offset} declares {declared} bytes but only {remaining} remain")]
    SubPackageOverrun {
        offset: usize,
        declared: u32,
        remaining: usize,
    },
}

/// Failure to decode one sub-package or robot message. Local to that record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Insufficient bytes at offset {offset}: need {needed}, {remaining} remaining")]
    InsufficientBytes {
        needed: usize,
        remaining: usize,
        offset: usize,
    },

    #[error("String at offset {offset} is not valid UTF-8")]
    InvalidString { offset: usize },
}

#[derive(Error, Debug)]
pub enum PrimaryError {
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dashboard error: {0}")]
    Dashboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PrimaryError {
    /// Framing and connection errors end the current stream.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PrimaryError::Framing(_) | PrimaryError::Connection(_) | PrimaryError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrimaryError::from(FramingError::HeaderTooShort { declared: 3 });
        assert_eq!(
            err.to_string(),
            "Framing error: Frame header declares 3 bytes, below the 5-byte minimum"
        );

        let err = DecodeError::InsufficientBytes { needed: 8, remaining: 2, offset: 39 };
        assert_eq!(err.to_string(), "Insufficient bytes at offset 39: need 8, 2 remaining");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(PrimaryError::from(FramingError::Truncated { needed: 5, available: 3 }).is_fatal());
        assert!(PrimaryError::Connection("closed".to_string()).is_fatal());
        assert!(!PrimaryError::from(DecodeError::InvalidString { offset: 0 }).is_fatal());
        assert!(!PrimaryError::Config("missing host".to_string()).is_fatal());
    }
}
