//! One-shot JPEG XL encoding through a native codec.
//!
//! The crate drives a two-phase handshake with the codec: a query that
//! reports the sizes of the encoded stream and ICC profile, then a fill
//! into buffers allocated to exactly those sizes.
//!
//! ```ignore
//! use jxl_wrapper::codec::mock::ScriptedCodec;
//! use jxl_wrapper::encoder::Encoder;
//!
//! let encoder = Encoder::new(ScriptedCodec::ok(4, 4, 32, 0));
//! let image = encoder.encode(&vec![0u8; 16], 4, 4)?;
//! assert_eq!(image.encoded_bytes.len(), 32);
//! ```

pub mod boundary;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod encoder;
pub mod error;
pub mod ffi;
pub mod format;
pub mod input;
pub mod pipeline;

pub use encoder::{EncodedImage, Encoder};
pub use error::{JxlWrapperError, Result};
pub use format::PixelFormat;
