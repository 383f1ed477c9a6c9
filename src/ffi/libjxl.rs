// Safe wrapper: libjxl behind the NativeCodec entry points

use std::collections::HashMap;
use std::ptr;
use std::sync::Mutex;
use std::thread::{self, ThreadId};

use super::libjxl_sys::{
    JXL_COLOR_PROFILE_TARGET_DATA, JXL_DEC_COLOR_ENCODING, JXL_DEC_ERROR,
    JXL_DEC_NEED_MORE_INPUT, JXL_DEC_SUCCESS, JXL_ENC_NEED_MORE_OUTPUT, JXL_ENC_SUCCESS,
    JXL_FALSE, JXL_NATIVE_ENDIAN, JXL_TYPE_UINT8, JxlBasicInfo, JxlColorEncoding,
    JxlColorEncodingSetToSRGB, JxlDecoder, JxlDecoderCloseInput, JxlDecoderCreate,
    JxlDecoderDestroy, JxlDecoderGetColorAsICCProfile, JxlDecoderGetICCProfileSize,
    JxlDecoderProcessInput, JxlDecoderSetInput, JxlDecoderSubscribeEvents, JxlEncoder,
    JxlEncoderAddImageFrame, JxlEncoderCloseInput, JxlEncoderCreate, JxlEncoderDestroy,
    JxlEncoderFrameSettingsCreate, JxlEncoderInitBasicInfo, JxlEncoderProcessOutput,
    JxlEncoderSetBasicInfo, JxlEncoderSetColorEncoding, JxlPixelFormat,
};
use crate::boundary::context::{
    FillContext, QueryContext, SLOT_FORMAT, SLOT_HEIGHT, SLOT_STATUS, SLOT_WIDTH, StreamInfo,
    pack_query_response,
};
use crate::boundary::status::Status;
use crate::codec::NativeCodec;
use crate::format::{PIXEL_FORMAT_WIRE_VERSION, PixelFormat};

// measure/produce decode formats with the version 1 table.
const _: () = assert!(PIXEL_FORMAT_WIRE_VERSION == 1);

const INITIAL_OUTPUT_CAPACITY: usize = 64 * 1024;

/// Why a native step failed, and the status code it maps to.
#[derive(Debug, Clone, Copy)]
struct Failure {
    status: Status,
    reason: &'static str,
}

impl Failure {
    fn fatal(reason: &'static str) -> Self {
        Failure {
            status: Status::InvalidStream,
            reason,
        }
    }
}

/// RAII owner of a `JxlEncoder*`.
struct EncoderHandle {
    ptr: *mut JxlEncoder,
}

impl EncoderHandle {
    fn create() -> Result<Self, Failure> {
        let ptr = unsafe { JxlEncoderCreate(ptr::null()) };
        if ptr.is_null() {
            Err(Failure::fatal("JxlEncoderCreate returned null"))
        } else {
            Ok(EncoderHandle { ptr })
        }
    }
}

impl Drop for EncoderHandle {
    fn drop(&mut self) {
        unsafe {
            if !self.ptr.is_null() {
                JxlEncoderDestroy(self.ptr);
            }
        }
    }
}

/// RAII owner of a `JxlDecoder*`.
struct DecoderHandle {
    ptr: *mut JxlDecoder,
}

impl DecoderHandle {
    fn create() -> Result<Self, Failure> {
        let ptr = unsafe { JxlDecoderCreate(ptr::null()) };
        if ptr.is_null() {
            Err(Failure::fatal("JxlDecoderCreate returned null"))
        } else {
            Ok(DecoderHandle { ptr })
        }
    }
}

impl Drop for DecoderHandle {
    fn drop(&mut self) {
        unsafe {
            if !self.ptr.is_null() {
                JxlDecoderDestroy(self.ptr);
            }
        }
    }
}

/// Encode 8-bit pixels into a bare JPEG XL codestream.
///
/// Gray input is tagged as sRGB gray, RGBA input as sRGB with 8-bit alpha.
/// `pixels` must hold at least `width * height * bytes_per_pixel` bytes.
fn encode_codestream(
    pixels: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
) -> Result<Vec<u8>, Failure> {
    let expected = format
        .buffer_len(width, height)
        .ok_or(Failure::fatal("pixel buffer size overflows usize"))?;
    if pixels.len() < expected {
        return Err(Failure {
            status: Status::NotEnoughInput,
            reason: "pixel buffer shorter than width * height * bytes_per_pixel",
        });
    }

    let encoder = EncoderHandle::create()?;

    unsafe {
        let mut info: JxlBasicInfo = std::mem::zeroed();
        JxlEncoderInitBasicInfo(&mut info);
        info.xsize = width;
        info.ysize = height;
        info.bits_per_sample = 8;
        info.exponent_bits_per_sample = 0;
        info.uses_original_profile = JXL_FALSE;
        info.num_color_channels = format.color_channels();
        info.alpha_bits = format.alpha_bits();
        info.num_extra_channels = u32::from(format.alpha_bits() > 0);
        if JxlEncoderSetBasicInfo(encoder.ptr, &info) != JXL_ENC_SUCCESS {
            return Err(Failure::fatal("JxlEncoderSetBasicInfo failed"));
        }

        let mut color: JxlColorEncoding = std::mem::zeroed();
        let is_gray = i32::from(format == PixelFormat::Gray);
        JxlColorEncodingSetToSRGB(&mut color, is_gray);
        if JxlEncoderSetColorEncoding(encoder.ptr, &color) != JXL_ENC_SUCCESS {
            return Err(Failure::fatal("JxlEncoderSetColorEncoding failed"));
        }

        let frame_settings = JxlEncoderFrameSettingsCreate(encoder.ptr, ptr::null());
        if frame_settings.is_null() {
            return Err(Failure::fatal("JxlEncoderFrameSettingsCreate returned null"));
        }

        let pixel_format = JxlPixelFormat {
            num_channels: format.bytes_per_pixel() as u32,
            data_type: JXL_TYPE_UINT8,
            endianness: JXL_NATIVE_ENDIAN,
            align: 0,
        };
        if JxlEncoderAddImageFrame(
            frame_settings,
            &pixel_format,
            pixels.as_ptr().cast(),
            expected,
        ) != JXL_ENC_SUCCESS
        {
            return Err(Failure::fatal("JxlEncoderAddImageFrame failed"));
        }
        JxlEncoderCloseInput(encoder.ptr);

        let mut out = vec![0u8; INITIAL_OUTPUT_CAPACITY];
        let mut next_out = out.as_mut_ptr();
        let mut avail_out = out.len();
        loop {
            let status = JxlEncoderProcessOutput(encoder.ptr, &mut next_out, &mut avail_out);
            if status == JXL_ENC_SUCCESS {
                let used = out.len() - avail_out;
                out.truncate(used);
                return Ok(out);
            }
            if status != JXL_ENC_NEED_MORE_OUTPUT {
                return Err(Failure::fatal("JxlEncoderProcessOutput failed"));
            }
            let used = out.len() - avail_out;
            out.resize(out.len() * 2, 0);
            next_out = out.as_mut_ptr().add(used);
            avail_out = out.len() - used;
        }
    }
}

/// Decode just far enough into `stream` to read its ICC profile.
fn icc_profile_of(stream: &[u8]) -> Result<Vec<u8>, Failure> {
    let decoder = DecoderHandle::create()?;

    unsafe {
        if JxlDecoderSubscribeEvents(decoder.ptr, JXL_DEC_COLOR_ENCODING) != JXL_DEC_SUCCESS {
            return Err(Failure::fatal("JxlDecoderSubscribeEvents failed"));
        }
        if JxlDecoderSetInput(decoder.ptr, stream.as_ptr(), stream.len()) != JXL_DEC_SUCCESS {
            return Err(Failure::fatal("JxlDecoderSetInput failed"));
        }
        JxlDecoderCloseInput(decoder.ptr);

        loop {
            match JxlDecoderProcessInput(decoder.ptr) {
                JXL_DEC_COLOR_ENCODING => {
                    let mut size = 0usize;
                    if JxlDecoderGetICCProfileSize(
                        decoder.ptr,
                        JXL_COLOR_PROFILE_TARGET_DATA,
                        &mut size,
                    ) != JXL_DEC_SUCCESS
                    {
                        return Err(Failure::fatal("JxlDecoderGetICCProfileSize failed"));
                    }
                    let mut icc = vec![0u8; size];
                    if JxlDecoderGetColorAsICCProfile(
                        decoder.ptr,
                        JXL_COLOR_PROFILE_TARGET_DATA,
                        icc.as_mut_ptr(),
                        size,
                    ) != JXL_DEC_SUCCESS
                    {
                        return Err(Failure::fatal("JxlDecoderGetColorAsICCProfile failed"));
                    }
                    return Ok(icc);
                }
                JXL_DEC_SUCCESS => {
                    return Err(Failure::fatal("stream finished without a color encoding"));
                }
                JXL_DEC_NEED_MORE_INPUT => {
                    return Err(Failure {
                        status: Status::NotEnoughInput,
                        reason: "truncated codestream",
                    });
                }
                JXL_DEC_ERROR => return Err(Failure::fatal("JxlDecoderProcessInput failed")),
                _ => continue,
            }
        }
    }
}

/// Identifies the measurement a `produce` call should pick up.
///
/// The fill context carries no dimensions, so the pair is matched on the
/// calling thread plus the pixel buffer. A caller runs query and fill on
/// one thread, so concurrent encodes of a shared buffer never see each
/// other's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StashKey {
    thread: ThreadId,
    pixels_addr: usize,
    pixels_len: usize,
    format_wire: i32,
}

impl StashKey {
    fn new(pixels: &[u8], format_wire: i32) -> Self {
        StashKey {
            thread: thread::current().id(),
            pixels_addr: pixels.as_ptr() as usize,
            pixels_len: pixels.len(),
            format_wire,
        }
    }
}

struct Measured {
    width: u32,
    height: u32,
    stream: Vec<u8>,
    icc: Vec<u8>,
}

/// [`NativeCodec`] backed by the system libjxl.
///
/// `measure` does the real work: it encodes the pixels, extracts the ICC
/// profile and keeps both until the matching `produce` on the same thread
/// hands them over to the caller's buffers, which must have exactly the
/// measured lengths. A second `measure` of the same buffer and format on
/// the same thread replaces the first. Measurements left behind by threads
/// that never call `produce` stay pending until
/// [`discard_pending`](Self::discard_pending) is called.
///
/// Every call creates its own libjxl encoder and decoder, and pending
/// results are scoped to the calling thread, so the codec is reentrant as
/// long as each query/fill pair runs on one thread.
#[derive(Default)]
pub struct LibJxlCodec {
    pending: Mutex<HashMap<StashKey, Measured>>,
}

impl LibJxlCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of measurements still waiting for `produce`.
    pub fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or_else(|e| e.into_inner().len())
    }

    pub fn discard_pending(&self) {
        match self.pending.lock() {
            Ok(mut p) => p.clear(),
            Err(e) => e.into_inner().clear(),
        }
    }

    fn stash(&self, key: StashKey, measured: Measured) {
        let replaced = match self.pending.lock() {
            Ok(mut p) => p.insert(key, measured),
            Err(e) => e.into_inner().insert(key, measured),
        };
        if let Some(stale) = replaced {
            tracing::debug!(
                width = stale.width,
                height = stale.height,
                "dropping unfilled measurement"
            );
        }
    }

    fn take(&self, key: &StashKey) -> Option<Measured> {
        match self.pending.lock() {
            Ok(mut p) => p.remove(key),
            Err(e) => e.into_inner().remove(key),
        }
    }

    fn measure_inner(&self, context: &QueryContext, pixels: &[u8]) -> Result<StreamInfo, Failure> {
        let format_wire = context[SLOT_FORMAT];
        let format = PixelFormat::from_wire(format_wire)
            .map_err(|_| Failure::fatal("unrecognized pixel format"))?;
        let width = u32::try_from(context[SLOT_WIDTH])
            .ok()
            .filter(|w| *w > 0)
            .ok_or(Failure::fatal("width must be positive"))?;
        let height = u32::try_from(context[SLOT_HEIGHT])
            .ok()
            .filter(|h| *h > 0)
            .ok_or(Failure::fatal("height must be positive"))?;

        let stream = encode_codestream(pixels, width, height, format)?;
        let icc = icc_profile_of(&stream)?;

        let pixels_size = i32::try_from(stream.len())
            .map_err(|_| Failure::fatal("encoded stream larger than i32::MAX"))?;
        let icc_size = i32::try_from(icc.len())
            .map_err(|_| Failure::fatal("ICC profile larger than i32::MAX"))?;

        self.stash(
            StashKey::new(pixels, format_wire),
            Measured {
                width,
                height,
                stream,
                icc,
            },
        );

        Ok(StreamInfo {
            status: Status::Ok,
            width: context[SLOT_WIDTH],
            height: context[SLOT_HEIGHT],
            pixels_size,
            icc_size,
            alpha_bits: format.alpha_bits() as i32,
        })
    }

    fn produce_inner(
        &self,
        context: &FillContext,
        output: &mut [u8],
        pixels: &[u8],
        icc: &mut [u8],
    ) -> Result<(), Failure> {
        let format_wire = context[SLOT_FORMAT];
        PixelFormat::from_wire(format_wire)
            .map_err(|_| Failure::fatal("unrecognized pixel format"))?;

        let measured = self
            .take(&StashKey::new(pixels, format_wire))
            .ok_or(Failure::fatal("produce called without a matching measure"))?;

        tracing::trace!(
            width = measured.width,
            height = measured.height,
            "handing over measured stream"
        );
        if output.len() != measured.stream.len() {
            return Err(Failure::fatal("output buffer length differs from measured size"));
        }
        if icc.len() != measured.icc.len() {
            return Err(Failure::fatal("icc buffer length differs from measured size"));
        }

        output.copy_from_slice(&measured.stream);
        icc.copy_from_slice(&measured.icc);
        Ok(())
    }
}

impl NativeCodec for LibJxlCodec {
    fn measure(&self, context: &mut QueryContext, pixels: &[u8]) {
        let info = match self.measure_inner(context, pixels) {
            Ok(info) => info,
            Err(failure) => {
                tracing::debug!(reason = failure.reason, "libjxl measure failed");
                StreamInfo {
                    status: failure.status,
                    width: 0,
                    height: 0,
                    pixels_size: 0,
                    icc_size: 0,
                    alpha_bits: 0,
                }
            }
        };
        pack_query_response(context, &info);
    }

    fn produce(&self, context: &mut FillContext, output: &mut [u8], pixels: &[u8], icc: &mut [u8]) {
        let status = match self.produce_inner(context, output, pixels, icc) {
            Ok(()) => Status::Ok,
            Err(failure) => {
                tracing::debug!(reason = failure.reason, "libjxl produce failed");
                failure.status
            }
        };
        context[SLOT_STATUS] = status.code();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_codestream_has_signature() {
        let pixels = vec![128u8; 16 * 16];
        let stream = encode_codestream(&pixels, 16, 16, PixelFormat::Gray).unwrap();
        // Bare codestream signature.
        assert_eq!(&stream[..2], &[0xFF, 0x0A]);
    }

    #[test]
    fn test_short_pixels_is_not_enough_input() {
        let failure = encode_codestream(&[0u8; 10], 16, 16, PixelFormat::Gray).unwrap_err();
        assert_eq!(failure.status, Status::NotEnoughInput);
    }

    #[test]
    fn test_icc_of_gray_stream() {
        let pixels = vec![255u8; 32 * 32];
        let stream = encode_codestream(&pixels, 32, 32, PixelFormat::Gray).unwrap();
        let icc = icc_profile_of(&stream).unwrap();
        assert!(!icc.is_empty());
    }

    fn measure_gray(codec: &LibJxlCodec, pixels: &[u8], width: i32, height: i32) -> [i32; 6] {
        let mut ctx = [PixelFormat::Gray.to_wire(), width, height, 0, 0, 0];
        codec.measure(&mut ctx, pixels);
        assert_eq!(ctx[SLOT_STATUS], 0);
        ctx
    }

    #[test]
    fn test_remeasure_on_same_thread_replaces_pending() {
        let codec = LibJxlCodec::new();
        let pixels = vec![90u8; 32 * 32];
        measure_gray(&codec, &pixels, 32, 32);
        let ctx = measure_gray(&codec, &pixels, 16, 64);
        assert_eq!(codec.pending(), 1);

        let expected = encode_codestream(&pixels, 16, 64, PixelFormat::Gray).unwrap();
        let mut output = vec![0u8; ctx[3] as usize];
        let mut icc = vec![0u8; ctx[4] as usize];
        let mut fill = [PixelFormat::Gray.to_wire()];
        codec.produce(&mut fill, &mut output, &pixels, &mut icc);
        assert_eq!(fill, [0]);
        assert_eq!(output, expected);
        assert_eq!(codec.pending(), 0);
    }

    #[test]
    fn test_measurement_is_not_visible_to_other_threads() {
        let codec = LibJxlCodec::new();
        let pixels = vec![90u8; 32 * 32];
        let ctx = measure_gray(&codec, &pixels, 32, 32);

        std::thread::scope(|s| {
            s.spawn(|| {
                let mut output = vec![0u8; ctx[3] as usize];
                let mut icc = vec![0u8; ctx[4] as usize];
                let mut fill = [PixelFormat::Gray.to_wire()];
                codec.produce(&mut fill, &mut output, &pixels, &mut icc);
                assert_eq!(fill, [-1]);
            });
        });
        assert_eq!(codec.pending(), 1);
        codec.discard_pending();
        assert_eq!(codec.pending(), 0);
    }

    #[test]
    fn test_produce_without_measure_fails() {
        let codec = LibJxlCodec::new();
        let mut ctx = [0];
        codec.produce(&mut ctx, &mut [0u8; 4], &[0u8; 4], &mut []);
        assert_eq!(ctx, [-1]);
    }
}
