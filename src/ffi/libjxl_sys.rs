// Hand-written FFI bindings for libjxl (>= 0.9).
// Only the encoder and decoder calls needed for one-shot encoding and ICC
// extraction are declared. Struct layouts mirror jxl/codestream_header.h,
// jxl/color_encoding.h and jxl/types.h.

use libc::{c_double, c_float, c_int, c_void, size_t};

pub type JxlBool = c_int;
pub const JXL_TRUE: JxlBool = 1;
pub const JXL_FALSE: JxlBool = 0;

/// Opaque encoder handle.
#[repr(C)]
pub struct JxlEncoder {
    _opaque: [u8; 0],
}

/// Opaque per-frame settings handle, owned by its encoder.
#[repr(C)]
pub struct JxlEncoderFrameSettings {
    _opaque: [u8; 0],
}

/// Opaque decoder handle.
#[repr(C)]
pub struct JxlDecoder {
    _opaque: [u8; 0],
}

// --- JxlEncoderStatus ---
pub type JxlEncoderStatus = c_int;
pub const JXL_ENC_SUCCESS: JxlEncoderStatus = 0;
pub const JXL_ENC_ERROR: JxlEncoderStatus = 1;
pub const JXL_ENC_NEED_MORE_OUTPUT: JxlEncoderStatus = 2;

// --- JxlDecoderStatus (subset) ---
pub type JxlDecoderStatus = c_int;
pub const JXL_DEC_SUCCESS: JxlDecoderStatus = 0;
pub const JXL_DEC_ERROR: JxlDecoderStatus = 1;
pub const JXL_DEC_NEED_MORE_INPUT: JxlDecoderStatus = 2;
pub const JXL_DEC_BASIC_INFO: JxlDecoderStatus = 0x40;
pub const JXL_DEC_COLOR_ENCODING: JxlDecoderStatus = 0x100;

// --- JxlColorProfileTarget ---
pub const JXL_COLOR_PROFILE_TARGET_ORIGINAL: c_int = 0;
pub const JXL_COLOR_PROFILE_TARGET_DATA: c_int = 1;

// --- JxlDataType / JxlEndianness ---
pub const JXL_TYPE_UINT8: c_int = 2;
pub const JXL_NATIVE_ENDIAN: c_int = 0;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JxlPixelFormat {
    pub num_channels: u32,
    pub data_type: c_int,
    pub endianness: c_int,
    pub align: size_t,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct JxlPreviewHeader {
    pub xsize: u32,
    pub ysize: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct JxlAnimationHeader {
    pub tps_numerator: u32,
    pub tps_denominator: u32,
    pub num_loops: u32,
    pub have_timecodes: JxlBool,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JxlBasicInfo {
    pub have_container: JxlBool,
    pub xsize: u32,
    pub ysize: u32,
    pub bits_per_sample: u32,
    pub exponent_bits_per_sample: u32,
    pub intensity_target: c_float,
    pub min_nits: c_float,
    pub relative_to_max_display: JxlBool,
    pub linear_below: c_float,
    pub uses_original_profile: JxlBool,
    pub have_preview: JxlBool,
    pub have_animation: JxlBool,
    pub orientation: c_int,
    pub num_color_channels: u32,
    pub num_extra_channels: u32,
    pub alpha_bits: u32,
    pub alpha_exponent_bits: u32,
    pub alpha_premultiplied: JxlBool,
    pub preview: JxlPreviewHeader,
    pub animation: JxlAnimationHeader,
    pub intrinsic_xsize: u32,
    pub intrinsic_ysize: u32,
    pub padding: [u8; 100],
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct JxlColorEncoding {
    pub color_space: c_int,
    pub white_point: c_int,
    pub white_point_xy: [c_double; 2],
    pub primaries: c_int,
    pub primaries_red_xy: [c_double; 2],
    pub primaries_green_xy: [c_double; 2],
    pub primaries_blue_xy: [c_double; 2],
    pub transfer_function: c_int,
    pub gamma: c_double,
    pub rendering_intent: c_int,
}

unsafe extern "C" {
    // --- Encoder ---

    pub fn JxlEncoderCreate(memory_manager: *const c_void) -> *mut JxlEncoder;
    pub fn JxlEncoderDestroy(enc: *mut JxlEncoder);
    pub fn JxlEncoderFrameSettingsCreate(
        enc: *mut JxlEncoder,
        source: *const JxlEncoderFrameSettings,
    ) -> *mut JxlEncoderFrameSettings;
    pub fn JxlEncoderInitBasicInfo(info: *mut JxlBasicInfo);
    pub fn JxlEncoderSetBasicInfo(enc: *mut JxlEncoder, info: *const JxlBasicInfo)
    -> JxlEncoderStatus;
    pub fn JxlEncoderSetColorEncoding(
        enc: *mut JxlEncoder,
        color: *const JxlColorEncoding,
    ) -> JxlEncoderStatus;
    pub fn JxlEncoderAddImageFrame(
        frame_settings: *const JxlEncoderFrameSettings,
        pixel_format: *const JxlPixelFormat,
        buffer: *const c_void,
        size: size_t,
    ) -> JxlEncoderStatus;
    pub fn JxlEncoderCloseInput(enc: *mut JxlEncoder);
    pub fn JxlEncoderProcessOutput(
        enc: *mut JxlEncoder,
        next_out: *mut *mut u8,
        avail_out: *mut size_t,
    ) -> JxlEncoderStatus;

    // --- Color encoding helpers ---

    pub fn JxlColorEncodingSetToSRGB(color_encoding: *mut JxlColorEncoding, is_gray: JxlBool);

    // --- Decoder (ICC extraction only) ---

    pub fn JxlDecoderCreate(memory_manager: *const c_void) -> *mut JxlDecoder;
    pub fn JxlDecoderDestroy(dec: *mut JxlDecoder);
    pub fn JxlDecoderSubscribeEvents(dec: *mut JxlDecoder, events_wanted: c_int)
    -> JxlDecoderStatus;
    pub fn JxlDecoderSetInput(dec: *mut JxlDecoder, data: *const u8, size: size_t)
    -> JxlDecoderStatus;
    pub fn JxlDecoderCloseInput(dec: *mut JxlDecoder);
    pub fn JxlDecoderProcessInput(dec: *mut JxlDecoder) -> JxlDecoderStatus;
    pub fn JxlDecoderGetICCProfileSize(
        dec: *const JxlDecoder,
        target: c_int,
        size: *mut size_t,
    ) -> JxlDecoderStatus;
    pub fn JxlDecoderGetColorAsICCProfile(
        dec: *const JxlDecoder,
        target: c_int,
        icc_profile: *mut u8,
        size: size_t,
    ) -> JxlDecoderStatus;
}
