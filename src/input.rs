// Loading pixel buffers from disk.

use std::path::Path;

use crate::error::{JxlWrapperError, Result};
use crate::format::PixelFormat;

/// Decoded pixels ready to hand to the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

/// Decode an image file (any format the `image` crate reads) into `format`.
pub fn load_image(path: &Path, format: PixelFormat) -> Result<RawImage> {
    let decoded = image::open(path)?;

    let (pixels, width, height) = match format {
        PixelFormat::Gray => {
            let gray = decoded.to_luma8();
            let (w, h) = gray.dimensions();
            (gray.into_raw(), w, h)
        }
        PixelFormat::Rgba8888 => {
            let rgba = decoded.to_rgba8();
            let (w, h) = rgba.dimensions();
            (rgba.into_raw(), w, h)
        }
    };

    Ok(RawImage {
        pixels,
        width,
        height,
        format,
    })
}

/// Read a headerless pixel dump of `width` x `height` pixels in `format`.
pub fn load_raw(path: &Path, width: u32, height: u32, format: PixelFormat) -> Result<RawImage> {
    let expected_len = format.buffer_len(width, height).ok_or_else(|| {
        JxlWrapperError::input(format!(
            "Overflow computing buffer size for {width}x{height} {format:?} image"
        ))
    })?;

    let pixels = std::fs::read(path)?;
    if pixels.len() != expected_len {
        return Err(JxlWrapperError::input(format!(
            "Raw data size mismatch for {}: expected {} bytes, got {}",
            path.display(),
            expected_len,
            pixels.len()
        )));
    }

    Ok(RawImage {
        pixels,
        width,
        height,
        format,
    })
}

/// Parse a `WIDTHxHEIGHT` dimension string such as `"640x480"`.
pub fn parse_dimensions(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| JxlWrapperError::input(format!("Invalid dimensions '{s}', expected WxH")))?;
    let width: u32 = w
        .trim()
        .parse()
        .map_err(|_| JxlWrapperError::input(format!("Invalid width in '{s}'")))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|_| JxlWrapperError::input(format!("Invalid height in '{s}'")))?;
    if width == 0 || height == 0 {
        return Err(JxlWrapperError::input(format!(
            "Dimensions must be non-zero, got '{s}'"
        )));
    }
    Ok((width, height))
}
