// Boundary adapter: checked calls into the native codec.

use crate::boundary::context::{
    StreamInfo, pack_fill_request, pack_query_request, unpack_fill_response,
    unpack_query_response,
};
use crate::boundary::status::Status;
use crate::buffer::ByteBuffer;
use crate::codec::NativeCodec;
use crate::error::{JxlWrapperError, Result};
use crate::format::{PIXEL_FORMAT_WIRE_VERSION, PixelFormat};

/// Performs the two native calls of the encode handshake.
///
/// Every buffer is checked for direct addressability before the codec is
/// entered; a failing check returns [`JxlWrapperError::InvalidArgument`]
/// and the codec is never called.
pub struct BoundaryAdapter<C> {
    codec: C,
}

impl<C: NativeCodec> BoundaryAdapter<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn into_codec(self) -> C {
        self.codec
    }

    /// Ask the codec how large the encoded stream and ICC profile will be.
    pub fn query<P>(
        &self,
        pixels: &P,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<StreamInfo>
    where
        P: ByteBuffer + ?Sized,
    {
        let pixels = pixels.as_direct().ok_or_else(|| {
            JxlWrapperError::invalid_argument("pixels must be a directly addressable buffer")
        })?;
        let width = dimension_to_wire("width", width)?;
        let height = dimension_to_wire("height", height)?;

        let mut context = pack_query_request(format, width, height);
        tracing::debug!(
            format = ?format,
            wire_version = PIXEL_FORMAT_WIRE_VERSION,
            width,
            height,
            pixels_len = pixels.len(),
            "crossing boundary: measure"
        );
        self.codec.measure(&mut context, pixels);
        tracing::debug!(context = ?context, "measure returned");

        unpack_query_response(&context)
    }

    /// Have the codec write the encoded stream and ICC profile.
    ///
    /// `output` and `icc` must already be sized from a preceding
    /// [`query`](Self::query) for the same pixels.
    pub fn fill<O, P, I>(
        &self,
        output: &mut O,
        pixels: &P,
        icc: &mut I,
        format: PixelFormat,
    ) -> Result<Status>
    where
        O: ByteBuffer + ?Sized,
        P: ByteBuffer + ?Sized,
        I: ByteBuffer + ?Sized,
    {
        let output = output.as_direct_mut().ok_or_else(|| {
            JxlWrapperError::invalid_argument("output must be a directly addressable buffer")
        })?;
        let pixels = pixels.as_direct().ok_or_else(|| {
            JxlWrapperError::invalid_argument("pixels must be a directly addressable buffer")
        })?;
        let icc = icc.as_direct_mut().ok_or_else(|| {
            JxlWrapperError::invalid_argument("icc must be a directly addressable buffer")
        })?;

        let mut context = pack_fill_request(format);
        tracing::debug!(
            format = ?format,
            wire_version = PIXEL_FORMAT_WIRE_VERSION,
            output_len = output.len(),
            pixels_len = pixels.len(),
            icc_len = icc.len(),
            "crossing boundary: produce"
        );
        self.codec.produce(&mut context, output, pixels, icc);
        tracing::debug!(status = context[0], "produce returned");

        unpack_fill_response(&context)
    }
}

/// Dimensions travel as signed 32-bit ints on the wire.
fn dimension_to_wire(name: &str, value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        JxlWrapperError::invalid_argument(format!(
            "{name} {value} exceeds i32::MAX and cannot be passed to the codec"
        ))
    })
}
