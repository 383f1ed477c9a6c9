// Scripted test double for the native codec.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::boundary::context::{FillContext, QueryContext, SLOT_ICC_SIZE, SLOT_PIXELS_SIZE};
use crate::codec::NativeCodec;

/// Buffer lengths observed by one `produce` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProduceCall {
    pub format_wire: i32,
    pub output_len: usize,
    pub pixels_len: usize,
    pub icc_len: usize,
}

/// A [`NativeCodec`] that replays fixed responses and records how it was called.
///
/// `measure` overwrites the whole query context with the scripted response.
/// `produce` writes the scripted fill status, fills the output buffer with
/// `output_byte` and copies `icc_bytes` into the ICC buffer. In strict mode
/// `produce` reports `-1` whenever the buffers it receives differ in length
/// from the scripted sizes.
#[derive(Debug)]
pub struct ScriptedCodec {
    query_response: QueryContext,
    fill_status: i32,
    strict: bool,
    output_byte: u8,
    icc_bytes: Vec<u8>,
    measure_calls: AtomicUsize,
    produce_calls: AtomicUsize,
    produce_log: Mutex<Vec<ProduceCall>>,
}

impl ScriptedCodec {
    /// Replay `query_response` from `measure` and `fill_status` from `produce`.
    pub fn new(query_response: QueryContext, fill_status: i32) -> Self {
        Self {
            query_response,
            fill_status,
            strict: false,
            output_byte: 0,
            icc_bytes: Vec::new(),
            measure_calls: AtomicUsize::new(0),
            produce_calls: AtomicUsize::new(0),
            produce_log: Mutex::new(Vec::new()),
        }
    }

    /// A codec that succeeds in both phases with the given sizes and no alpha.
    pub fn ok(width: i32, height: i32, pixels_size: i32, icc_size: i32) -> Self {
        Self::new([0, width, height, pixels_size, icc_size, 0], 0)
    }

    /// Enable the buffer size conformance check in `produce`.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Byte written to every position of the output buffer.
    pub fn with_output_byte(mut self, byte: u8) -> Self {
        self.output_byte = byte;
        self
    }

    /// Bytes copied into the ICC buffer, truncated to its length.
    pub fn with_icc_bytes(mut self, icc: Vec<u8>) -> Self {
        self.icc_bytes = icc;
        self
    }

    pub fn measure_calls(&self) -> usize {
        self.measure_calls.load(Ordering::SeqCst)
    }

    pub fn produce_calls(&self) -> usize {
        self.produce_calls.load(Ordering::SeqCst)
    }

    /// Total number of native entry point invocations.
    pub fn total_calls(&self) -> usize {
        self.measure_calls() + self.produce_calls()
    }

    pub fn produce_log(&self) -> Vec<ProduceCall> {
        self.produce_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    fn sizes_conform(&self, output_len: usize, icc_len: usize) -> bool {
        let expected_output = usize::try_from(self.query_response[SLOT_PIXELS_SIZE]).ok();
        let expected_icc = usize::try_from(self.query_response[SLOT_ICC_SIZE]).ok();
        expected_output == Some(output_len) && expected_icc == Some(icc_len)
    }
}

impl NativeCodec for ScriptedCodec {
    fn measure(&self, context: &mut QueryContext, _pixels: &[u8]) {
        self.measure_calls.fetch_add(1, Ordering::SeqCst);
        *context = self.query_response;
    }

    fn produce(&self, context: &mut FillContext, output: &mut [u8], pixels: &[u8], icc: &mut [u8]) {
        self.produce_calls.fetch_add(1, Ordering::SeqCst);
        let call = ProduceCall {
            format_wire: context[0],
            output_len: output.len(),
            pixels_len: pixels.len(),
            icc_len: icc.len(),
        };
        match self.produce_log.lock() {
            Ok(mut log) => log.push(call),
            Err(e) => e.into_inner().push(call),
        }

        if self.strict && !self.sizes_conform(output.len(), icc.len()) {
            context[0] = -1;
            return;
        }

        output.fill(self.output_byte);
        let n = self.icc_bytes.len().min(icc.len());
        icc[..n].copy_from_slice(&self.icc_bytes[..n]);
        context[0] = self.fill_status;
    }
}
