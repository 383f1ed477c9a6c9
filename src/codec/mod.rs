pub mod mock;

use std::sync::Mutex;

use crate::boundary::context::{FillContext, QueryContext};

/// The two entry points exposed by a native JPEG XL encoder.
///
/// Implementations receive the flat context arrays described in
/// [`crate::boundary::context`], read the request slots and overwrite them
/// with the response in place. They never fail in the Rust sense: every
/// outcome is reported through the status slot.
///
/// Buffers passed here have already been checked for direct
/// addressability by the [`BoundaryAdapter`](crate::boundary::adapter::BoundaryAdapter).
pub trait NativeCodec: Send + Sync {
    /// Compute the sizes needed to hold the encoded stream and ICC profile.
    fn measure(&self, context: &mut QueryContext, pixels: &[u8]);

    /// Write the encoded stream into `output` and the ICC profile into `icc`.
    fn produce(&self, context: &mut FillContext, output: &mut [u8], pixels: &[u8], icc: &mut [u8]);
}

impl<C: NativeCodec + ?Sized> NativeCodec for &C {
    fn measure(&self, context: &mut QueryContext, pixels: &[u8]) {
        (**self).measure(context, pixels)
    }

    fn produce(&self, context: &mut FillContext, output: &mut [u8], pixels: &[u8], icc: &mut [u8]) {
        (**self).produce(context, output, pixels, icc)
    }
}

impl<C: NativeCodec + ?Sized> NativeCodec for Box<C> {
    fn measure(&self, context: &mut QueryContext, pixels: &[u8]) {
        (**self).measure(context, pixels)
    }

    fn produce(&self, context: &mut FillContext, output: &mut [u8], pixels: &[u8], icc: &mut [u8]) {
        (**self).produce(context, output, pixels, icc)
    }
}

/// Serializes every call into a codec that is not reentrant.
///
/// Concurrent `encode` calls on independent buffers share no state in this
/// crate, but a native library with global state must only be entered by
/// one thread at a time. Wrap such a codec in `Serialized`.
pub struct Serialized<C> {
    inner: C,
    gate: Mutex<()>,
}

impl<C: NativeCodec> Serialized<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            gate: Mutex::new(()),
        }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: NativeCodec> NativeCodec for Serialized<C> {
    fn measure(&self, context: &mut QueryContext, pixels: &[u8]) {
        // A poisoned gate only means another caller panicked mid-call; the
        // unit value it guards is still usable.
        let _guard = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.measure(context, pixels);
    }

    fn produce(&self, context: &mut FillContext, output: &mut [u8], pixels: &[u8], icc: &mut [u8]) {
        let _guard = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.produce(context, output, pixels, icc);
    }
}
