use std::path::Path;

use serde::Deserialize;

use crate::format::PixelFormat;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Format used by `Encoder::encode` when none is given.
    pub pixel_format: PixelFormat,
    /// Route every native call through a mutex.
    pub serialize_codec_calls: bool,
    /// Batch mode worker count; 0 lets rayon decide.
    pub parallel_workers: usize,
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            pixel_format: PixelFormat::Gray,
            serialize_codec_calls: false,
            parallel_workers: 0,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        Ok(serde_yml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
