// Status codes returned by the native codec.

use crate::error::{JxlWrapperError, Result};

/// Outcome reported by the native codec for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    /// Fatal failure: the input cannot be encoded.
    InvalidStream,
    /// Non-fatal failure: more input data was needed.
    NotEnoughInput,
}

impl Status {
    /// Decode a raw status integer.
    ///
    /// The table is closed: any value other than `0`, `-1` or `1` means the
    /// wrapper and the native library disagree on the protocol.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Status::Ok),
            -1 => Ok(Status::InvalidStream),
            1 => Ok(Status::NotEnoughInput),
            other => {
                tracing::error!(code = other, "native codec returned unknown status code");
                Err(JxlWrapperError::UnknownStatusCode(other))
            }
        }
    }

    /// Raw integer for this status.
    pub const fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::InvalidStream => -1,
            Status::NotEnoughInput => 1,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}
