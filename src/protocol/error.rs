use serde::{Deserialize, Serialize};

use crate::core::MintError;

/// Machine-readable error codes for the wire protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ExhaustedSpace,
    StorageCorrupt,
    IoError,
}

impl ErrorCode {
    /// Suggested HTTP status code for this error.
    /// Transport-agnostic (returns u16, not an axum type).
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ExhaustedSpace => 503,
            Self::StorageCorrupt | Self::IoError => 500,
        }
    }
}

impl From<&MintError> for ErrorCode {
    fn from(e: &MintError) -> Self {
        match e {
            MintError::ExhaustedSpace => Self::ExhaustedSpace,
            MintError::StorageCorrupt { .. } => Self::StorageCorrupt,
            MintError::Io(_) => Self::IoError,
        }
    }
}
