// Encoding facade: measure-then-fill handshake against a scripted codec

use jxl_wrapper::boundary::status::Status;
use jxl_wrapper::buffer::SegmentedBuffer;
use jxl_wrapper::codec::mock::ScriptedCodec;
use jxl_wrapper::encoder::Encoder;
use jxl_wrapper::error::JxlWrapperError;
use jxl_wrapper::format::PixelFormat;

const DIM: u32 = 1024;

fn white_gray_image() -> Vec<u8> {
    vec![255u8; (DIM * DIM) as usize]
}

// ============================================================
// 1. End-to-end GRAY scenario
// ============================================================

#[test]
fn test_encode_gray_end_to_end() {
    let codec = ScriptedCodec::ok(1024, 1024, 1024 * 1024, 732).strict();
    let encoder = Encoder::new(codec);

    let image = encoder
        .encode(&white_gray_image(), DIM, DIM)
        .expect("encode should succeed");

    assert_eq!(image.width, 1024);
    assert_eq!(image.height, 1024);
    assert_eq!(image.encoded_bytes.len(), 1024 * 1024);
    assert_eq!(image.icc_profile.len(), 732);
    assert_eq!(image.format, PixelFormat::Gray);
    assert_eq!(image.alpha_bits, 0);
}

#[test]
fn test_encode_calls_each_phase_once() {
    let encoder = Encoder::new(ScriptedCodec::ok(1024, 1024, 4096, 732));
    encoder.encode(&white_gray_image(), DIM, DIM).unwrap();

    assert_eq!(encoder.codec().measure_calls(), 1);
    assert_eq!(encoder.codec().produce_calls(), 1);
}

#[test]
fn test_encoded_bytes_come_from_codec() {
    let icc: Vec<u8> = (0..16).collect();
    let codec = ScriptedCodec::ok(4, 4, 8, 16)
        .with_output_byte(0x5A)
        .with_icc_bytes(icc.clone());
    let encoder = Encoder::new(codec);

    let image = encoder.encode(&vec![0u8; 16], 4, 4).unwrap();
    assert_eq!(image.encoded_bytes, vec![0x5A; 8]);
    assert_eq!(image.icc_profile, icc);
}

#[test]
fn test_encode_rgba_reports_alpha_bits() {
    let codec = ScriptedCodec::new([0, 2, 2, 40, 100, 8], 0);
    let encoder = Encoder::new(codec);

    let image = encoder.encode_rgba(&vec![0u8; 16], 2, 2).unwrap();
    assert_eq!(image.format, PixelFormat::Rgba8888);
    assert_eq!(image.alpha_bits, 8);
    assert_eq!(encoder.codec().produce_log()[0].format_wire, 1);
}

#[test]
fn test_zero_sized_outputs_are_allowed() {
    let encoder = Encoder::new(ScriptedCodec::ok(0, 0, 0, 0).strict());
    let image = encoder.encode(&Vec::<u8>::new(), 0, 0).unwrap();
    assert!(image.encoded_bytes.is_empty());
    assert!(image.icc_profile.is_empty());
}

// ============================================================
// 2. Two-phase size agreement
// ============================================================

#[test]
fn test_fill_buffers_match_query_sizes() {
    let encoder = Encoder::new(ScriptedCodec::ok(1024, 1024, 12345, 678));
    encoder.encode(&white_gray_image(), DIM, DIM).unwrap();

    let log = encoder.codec().produce_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].output_len, 12345);
    assert_eq!(log[0].icc_len, 678);
    assert_eq!(log[0].pixels_len, (DIM * DIM) as usize);
}

#[test]
fn test_mismatched_fill_buffer_is_rejected_by_strict_codec() {
    use jxl_wrapper::boundary::adapter::BoundaryAdapter;

    let adapter = BoundaryAdapter::new(ScriptedCodec::ok(8, 8, 64, 10).strict());
    let pixels = vec![0u8; 64];
    let info = adapter.query(&pixels, 8, 8, PixelFormat::Gray).unwrap();
    assert_eq!(info.pixels_size, 64);

    // Allocate one byte short of what the query reported.
    let mut output = vec![0u8; info.pixels_size as usize - 1];
    let mut icc = vec![0u8; info.icc_size as usize];
    let status = adapter
        .fill(&mut output, &pixels, &mut icc, PixelFormat::Gray)
        .unwrap();
    assert_eq!(status, Status::InvalidStream);
}

// ============================================================
// 3. Failure scenarios
// ============================================================

#[test]
fn test_query_invalid_stream_fails_without_fill() {
    let encoder = Encoder::new(ScriptedCodec::new([-1, 0, 0, 0, 0, 0], 0));

    let err = encoder.encode(&white_gray_image(), DIM, DIM).unwrap_err();
    assert!(
        matches!(
            err,
            JxlWrapperError::EncodingFailed {
                phase: "query",
                status: Status::InvalidStream
            }
        ),
        "unexpected error: {err:?}"
    );
    assert_eq!(encoder.codec().produce_calls(), 0);
}

#[test]
fn test_query_not_enough_input_fails() {
    let encoder = Encoder::new(ScriptedCodec::new([1, 0, 0, 0, 0, 0], 0));
    let err = encoder.encode(&vec![0u8; 4], 2, 2).unwrap_err();
    assert!(matches!(
        err,
        JxlWrapperError::EncodingFailed {
            status: Status::NotEnoughInput,
            ..
        }
    ));
    assert_eq!(encoder.codec().produce_calls(), 0);
}

#[test]
fn test_fill_invalid_stream_fails() {
    let encoder = Encoder::new(ScriptedCodec::new([0, 2, 2, 4, 4, 0], -1));
    let err = encoder.encode(&vec![0u8; 4], 2, 2).unwrap_err();
    assert!(matches!(
        err,
        JxlWrapperError::EncodingFailed {
            phase: "fill",
            status: Status::InvalidStream
        }
    ));
}

#[test]
fn test_unknown_fill_status_is_fatal() {
    let encoder = Encoder::new(ScriptedCodec::new([0, 2, 2, 4, 4, 0], 42));
    let err = encoder.encode(&vec![0u8; 4], 2, 2).unwrap_err();
    assert!(matches!(err, JxlWrapperError::UnknownStatusCode(42)));
}

#[test]
fn test_unknown_query_status_is_fatal() {
    let encoder = Encoder::new(ScriptedCodec::new([-2, 2, 2, 4, 4, 0], 0));
    let err = encoder.encode(&vec![0u8; 4], 2, 2).unwrap_err();
    assert!(matches!(err, JxlWrapperError::UnknownStatusCode(-2)));
    assert_eq!(encoder.codec().produce_calls(), 0);
}

// ============================================================
// 4. Negative sizes are a protocol violation
// ============================================================

#[test]
fn test_each_negative_field_is_protocol_violation() {
    // Slots 1..=5: width, height, pixels_size, icc_size, alpha_bits.
    for slot in 1..6 {
        let mut response = [0, 4, 4, 16, 8, 0];
        response[slot] = -1;
        let encoder = Encoder::new(ScriptedCodec::new(response, 0));

        let err = encoder.encode(&vec![0u8; 16], 4, 4).unwrap_err();
        assert!(
            matches!(err, JxlWrapperError::ProtocolViolation(_)),
            "slot {slot}: expected ProtocolViolation, got {err:?}"
        );
        assert_eq!(
            encoder.codec().produce_calls(),
            0,
            "slot {slot}: fill must not run after a protocol violation"
        );
    }
}

#[test]
fn test_negative_size_with_bad_status_reports_encoding_failed() {
    // Status is checked before sizes.
    let encoder = Encoder::new(ScriptedCodec::new([-1, -1, -1, -1, -1, -1], 0));
    let err = encoder.encode(&vec![0u8; 16], 4, 4).unwrap_err();
    assert!(matches!(err, JxlWrapperError::EncodingFailed { .. }));
}

// ============================================================
// 5. Addressability
// ============================================================

#[test]
fn test_encode_rejects_segmented_pixels() {
    let encoder = Encoder::new(ScriptedCodec::ok(2, 2, 4, 0));
    let pixels = SegmentedBuffer::from(vec![vec![0u8; 2], vec![0u8; 2]]);

    let err = encoder.encode(&pixels, 2, 2).unwrap_err();
    assert!(matches!(err, JxlWrapperError::InvalidArgument(_)));
    assert_eq!(encoder.codec().total_calls(), 0);
}

#[test]
fn test_encode_accepts_borrowed_slice() {
    let encoder = Encoder::new(ScriptedCodec::ok(2, 2, 4, 0));
    let data = [7u8; 4];
    let image = encoder.encode(&data[..], 2, 2).unwrap();
    assert_eq!(image.encoded_bytes.len(), 4);
}
