// Byte buffers as seen by the boundary: contiguous or not.

/// A byte region that may be handed to the native codec.
///
/// The codec reads and writes through a single raw pointer, so only
/// buffers that are one contiguous region can cross the boundary without
/// an intermediate copy. Such buffers return `Some` from
/// [`as_direct`](ByteBuffer::as_direct); everything else returns `None`
/// and is rejected before any native call is made.
pub trait ByteBuffer {
    /// Total number of bytes held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole buffer as one contiguous slice, if it is one.
    fn as_direct(&self) -> Option<&[u8]>;

    /// Mutable counterpart of [`as_direct`](ByteBuffer::as_direct).
    fn as_direct_mut(&mut self) -> Option<&mut [u8]>;
}

impl ByteBuffer for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn as_direct(&self) -> Option<&[u8]> {
        Some(self)
    }

    fn as_direct_mut(&mut self) -> Option<&mut [u8]> {
        Some(self)
    }
}

impl ByteBuffer for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn as_direct(&self) -> Option<&[u8]> {
        Some(self.as_slice())
    }

    fn as_direct_mut(&mut self) -> Option<&mut [u8]> {
        Some(self.as_mut_slice())
    }
}

impl ByteBuffer for Box<[u8]> {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn as_direct(&self) -> Option<&[u8]> {
        Some(&self[..])
    }

    fn as_direct_mut(&mut self) -> Option<&mut [u8]> {
        Some(&mut self[..])
    }
}

/// A buffer made of several independently allocated chunks.
///
/// Useful for assembling large inputs piecewise, but never directly
/// addressable: flatten it with [`SegmentedBuffer::to_contiguous`] first.
#[derive(Debug, Clone, Default)]
pub struct SegmentedBuffer {
    chunks: Vec<Vec<u8>>,
}

impl SegmentedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chunk(&mut self, chunk: Vec<u8>) {
        self.chunks.push(chunk);
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Copy every chunk, in order, into one contiguous `Vec`.
    pub fn to_contiguous(&self) -> Vec<u8> {
        self.chunks.concat()
    }
}

impl From<Vec<Vec<u8>>> for SegmentedBuffer {
    fn from(chunks: Vec<Vec<u8>>) -> Self {
        Self { chunks }
    }
}

impl ByteBuffer for SegmentedBuffer {
    fn len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    fn as_direct(&self) -> Option<&[u8]> {
        None
    }

    fn as_direct_mut(&mut self) -> Option<&mut [u8]> {
        None
    }
}
