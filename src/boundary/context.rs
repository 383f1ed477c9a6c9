// Flat integer context arrays exchanged with the native codec.
//
// Query context, 6 slots:
//   request:  [format, width, height, 0, 0, 0]
//   response: [status, width, height, pixels_size, icc_size, alpha_bits]
//
// Fill context, 1 slot:
//   request:  [format]
//   response: [status]
//
// Both sides must agree on these offsets. Nothing outside `boundary` and
// the codec implementations should see the raw arrays.

use crate::boundary::status::Status;
use crate::error::Result;
use crate::format::PixelFormat;

pub const QUERY_CONTEXT_LEN: usize = 6;
pub const FILL_CONTEXT_LEN: usize = 1;

pub const SLOT_STATUS: usize = 0;
pub const SLOT_FORMAT: usize = 0;
pub const SLOT_WIDTH: usize = 1;
pub const SLOT_HEIGHT: usize = 2;
pub const SLOT_PIXELS_SIZE: usize = 3;
pub const SLOT_ICC_SIZE: usize = 4;
pub const SLOT_ALPHA_BITS: usize = 5;

pub type QueryContext = [i32; QUERY_CONTEXT_LEN];
pub type FillContext = [i32; FILL_CONTEXT_LEN];

/// Result of the query phase, decoded from a [`QueryContext`].
///
/// Numeric fields are kept signed exactly as received; the facade decides
/// what a negative value means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub status: Status,
    pub width: i32,
    pub height: i32,
    pub pixels_size: i32,
    pub icc_size: i32,
    pub alpha_bits: i32,
}

impl StreamInfo {
    /// Names and values of the size fields that are negative.
    pub fn negative_fields(&self) -> Vec<(&'static str, i32)> {
        [
            ("width", self.width),
            ("height", self.height),
            ("pixels_size", self.pixels_size),
            ("icc_size", self.icc_size),
            ("alpha_bits", self.alpha_bits),
        ]
        .into_iter()
        .filter(|(_, v)| *v < 0)
        .collect()
    }
}

pub fn pack_query_request(format: PixelFormat, width: i32, height: i32) -> QueryContext {
    let mut ctx = [0; QUERY_CONTEXT_LEN];
    ctx[SLOT_FORMAT] = format.to_wire();
    ctx[SLOT_WIDTH] = width;
    ctx[SLOT_HEIGHT] = height;
    ctx
}

pub fn unpack_query_response(ctx: &QueryContext) -> Result<StreamInfo> {
    Ok(StreamInfo {
        status: Status::from_code(ctx[SLOT_STATUS])?,
        width: ctx[SLOT_WIDTH],
        height: ctx[SLOT_HEIGHT],
        pixels_size: ctx[SLOT_PIXELS_SIZE],
        icc_size: ctx[SLOT_ICC_SIZE],
        alpha_bits: ctx[SLOT_ALPHA_BITS],
    })
}

/// Write a query response into `ctx`. Used by codec implementations.
pub fn pack_query_response(ctx: &mut QueryContext, info: &StreamInfo) {
    ctx[SLOT_STATUS] = info.status.code();
    ctx[SLOT_WIDTH] = info.width;
    ctx[SLOT_HEIGHT] = info.height;
    ctx[SLOT_PIXELS_SIZE] = info.pixels_size;
    ctx[SLOT_ICC_SIZE] = info.icc_size;
    ctx[SLOT_ALPHA_BITS] = info.alpha_bits;
}

pub fn pack_fill_request(format: PixelFormat) -> FillContext {
    [format.to_wire()]
}

pub fn unpack_fill_response(ctx: &FillContext) -> Result<Status> {
    Status::from_code(ctx[SLOT_STATUS])
}
