use thiserror::Error;

use crate::boundary::status::Status;

#[derive(Debug, Error)]
pub enum JxlWrapperError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Encoding failed during {phase}: codec reported {status:?}")]
    EncodingFailed { phase: &'static str, status: Status },

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Unknown status code: {0}")]
    UnknownStatusCode(i32),

    #[error("Unknown pixel format wire value: {0}")]
    UnknownPixelFormat(i32),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`JxlWrapperError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl JxlWrapperError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create an invalid argument error.
    invalid_argument => InvalidArgument,
    /// Create a protocol violation error.
    protocol_violation => ProtocolViolation,
    /// Create a configuration error.
    config => ConfigError,
    /// Create an input error.
    input => InputError,
}

impl JxlWrapperError {
    /// Create an encoding failure for the given protocol phase.
    pub fn encoding_failed(phase: &'static str, status: Status) -> Self {
        Self::EncodingFailed { phase, status }
    }
}

impl From<serde_yml::Error> for JxlWrapperError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

impl From<image::ImageError> for JxlWrapperError {
    fn from(e: image::ImageError) -> Self {
        Self::InputError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JxlWrapperError>;
