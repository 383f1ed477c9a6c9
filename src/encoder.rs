// One-shot encoding facade: measure, allocate, fill.

use crate::boundary::adapter::BoundaryAdapter;
use crate::buffer::ByteBuffer;
use crate::codec::NativeCodec;
use crate::error::{JxlWrapperError, Result};
use crate::format::PixelFormat;

/// A fully encoded image. Owned by the caller once returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    /// The JPEG XL codestream.
    pub encoded_bytes: Vec<u8>,
    pub icc_profile: Vec<u8>,
    pub alpha_bits: u32,
    pub format: PixelFormat,
}

/// Encodes pixel buffers through a [`NativeCodec`].
///
/// Each call runs the query phase, allocates exactly the sizes reported,
/// then runs the fill phase. Any failure discards all work; there is no
/// retry and no partial result.
pub struct Encoder<C> {
    adapter: BoundaryAdapter<C>,
    default_format: PixelFormat,
}

impl<C: NativeCodec> Encoder<C> {
    /// Create an encoder whose [`encode`](Self::encode) uses GRAY.
    pub fn new(codec: C) -> Self {
        Self::with_default_format(codec, PixelFormat::Gray)
    }

    pub fn with_default_format(codec: C, default_format: PixelFormat) -> Self {
        Self {
            adapter: BoundaryAdapter::new(codec),
            default_format,
        }
    }

    pub fn default_format(&self) -> PixelFormat {
        self.default_format
    }

    pub fn codec(&self) -> &C {
        self.adapter.codec()
    }

    /// Encode using the default format.
    pub fn encode<P>(&self, pixels: &P, width: u32, height: u32) -> Result<EncodedImage>
    where
        P: ByteBuffer + ?Sized,
    {
        self.encode_with_format(pixels, width, height, self.default_format)
    }

    /// Encode 8-bit RGBA pixels.
    pub fn encode_rgba<P>(&self, pixels: &P, width: u32, height: u32) -> Result<EncodedImage>
    where
        P: ByteBuffer + ?Sized,
    {
        self.encode_with_format(pixels, width, height, PixelFormat::Rgba8888)
    }

    pub fn encode_with_format<P>(
        &self,
        pixels: &P,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<EncodedImage>
    where
        P: ByteBuffer + ?Sized,
    {
        let info = self.adapter.query(pixels, width, height, format)?;
        if !info.status.is_ok() {
            tracing::warn!(status = ?info.status, "codec rejected input during query");
            return Err(JxlWrapperError::encoding_failed("query", info.status));
        }

        let negative = info.negative_fields();
        if !negative.is_empty() {
            tracing::error!(fields = ?negative, "codec returned negative sizes");
            return Err(JxlWrapperError::protocol_violation(format!(
                "codec returned negative size fields: {negative:?}"
            )));
        }

        // Non-negative i32 values always fit in u32 and usize.
        let out_width = info.width as u32;
        let out_height = info.height as u32;
        let alpha_bits = info.alpha_bits as u32;
        let mut encoded_bytes = vec![0u8; info.pixels_size as usize];
        let mut icc_profile = vec![0u8; info.icc_size as usize];

        let status = self
            .adapter
            .fill(&mut encoded_bytes, pixels, &mut icc_profile, format)?;
        if !status.is_ok() {
            tracing::warn!(status = ?status, "codec failed during fill");
            return Err(JxlWrapperError::encoding_failed("fill", status));
        }

        tracing::debug!(
            width = out_width,
            height = out_height,
            encoded_len = encoded_bytes.len(),
            icc_len = icc_profile.len(),
            "encoded image"
        );

        Ok(EncodedImage {
            width: out_width,
            height: out_height,
            encoded_bytes,
            icc_profile,
            alpha_bits,
            format,
        })
    }
}
