//! Edge case integration tests for the Select decoder.
//!
//! Every malformed fixture under `tests/golden/edge_cases/` must stop the
//! decode with a typed error, and everything decoded before the bad
//! message must survive in the folded output:
//!
//! - **Truncation**: the source ends inside the final message's checksum.
//! - **Corrupt checksum**: one payload bit flipped in the first message.
//! - **Unsupported value type**: a header whose type byte is 6, not 7.
//! - **Duplicate header**: `:event-type` appears twice in one message.
//! - **Negative payload length**: the prelude claims more header bytes than
//!   the message can hold.
//!
//! Error messages are pinned with inline snapshots since they are what the
//! CLI shows a user.

use std::path::Path;

use insta::assert_snapshot;
use s3select_decoder::{
    DecodeError, DecoderConfig, ErrorKind, SelectDecoder, SelectEvent, SelectOutput,
};
use s3select_encoder::EventStreamEncoder;
use s3select_types::EventType;
use s3select_wire::{FrameLimits, Headers, WireError};

fn golden(subpath: &str) -> Vec<u8> {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let fixture_path = manifest_dir
        .join("tests/golden")
        .join(subpath)
        .join("stream.bin");
    std::fs::read(&fixture_path)
        .unwrap_or_else(|e| panic!("failed to read golden fixture {}: {e}", fixture_path.display()))
}

fn failed(output: &SelectOutput) -> &DecodeError {
    output
        .error()
        .unwrap_or_else(|| panic!("expected a failed decode, got {:?}", output.terminal))
}

// ── Truncation ────────────────────────────────────────────────────────────────

#[test]
fn truncated_stream_keeps_decoded_records() {
    let output = SelectDecoder::decode(&golden("edge_cases/truncated"));
    assert_eq!(output.payload, b"hello, world");
    let err = failed(&output);
    assert_eq!(err.kind(), ErrorKind::Framing);
    assert_snapshot!(err.to_string(), @"short read in message checksum: expected 4 bytes");
}

#[test]
fn truncated_stream_emits_both_records_first() {
    let body = golden("edge_cases/truncated");
    let items: Vec<_> = SelectDecoder::new(body.as_slice()).collect();
    assert_eq!(items.len(), 3);
    assert!(matches!(&items[0], Ok(SelectEvent::Records(r)) if r == b"hello, "));
    assert!(matches!(&items[1], Ok(SelectEvent::Records(r)) if r == b"world"));
    assert!(matches!(
        &items[2],
        Err(DecodeError::Wire(WireError::ShortRead { .. }))
    ));
}

#[test]
fn truncated_inside_prelude() {
    let body = golden("scenario_a");
    let err = SelectDecoder::decode(&body[..7]).into_result().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Framing);
    assert_snapshot!(err.to_string(), @"short read in prelude: expected 8 bytes");
}

#[test]
fn empty_source_is_missing_end() {
    let err = SelectDecoder::decode(&[]).into_result().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Framing);
    assert_snapshot!(err.to_string(), @"event stream ended without an End event");
}

// ── Corrupt checksum ──────────────────────────────────────────────────────────

#[test]
fn bad_message_crc_rejects_first_message() {
    let output = SelectDecoder::decode(&golden("edge_cases/bad_message_crc"));
    assert!(output.payload.is_empty(), "corrupt payload leaked");
    let err = failed(&output);
    assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);
    assert_snapshot!(
        err.to_string(),
        @"message checksum mismatch: expected 0x3A910A78, computed 0x9CE601CC"
    );
}

// ── Header value types ────────────────────────────────────────────────────────

#[test]
fn unsupported_value_type_after_records() {
    let output = SelectDecoder::decode(&golden("edge_cases/unsupported_value_type"));
    assert_eq!(output.payload, b"ok");
    let err = failed(&output);
    assert_eq!(err.kind(), ErrorKind::UnsupportedHeaderValueType);
    assert_snapshot!(err.to_string(), @r#"unsupported value type 6 for header ":event-type""#);
}

#[test]
fn duplicate_header_is_fatal() {
    let output = SelectDecoder::decode(&golden("edge_cases/duplicate_header"));
    assert!(output.payload.is_empty());
    let err = failed(&output);
    assert_eq!(err.kind(), ErrorKind::Framing);
    assert_snapshot!(err.to_string(), @r#"duplicate header ":event-type""#);
}

// ── Lengths and limits ────────────────────────────────────────────────────────

#[test]
fn negative_payload_length_is_fatal() {
    let err = SelectDecoder::decode(&golden("edge_cases/negative_payload"))
        .into_result()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Framing);
    assert_snapshot!(
        err.to_string(),
        @"invalid prelude: total length 20 cannot hold 10 header bytes and 16 bytes of framing"
    );
}

#[test]
fn message_over_limit_is_rejected_before_reading_it() {
    let body = EventStreamEncoder::new()
        .add_records(&[b'x'; 4096])
        .add_end()
        .encode()
        .unwrap();
    let config = DecoderConfig::default().with_limits(FrameLimits {
        max_message_len: 1024,
        ..FrameLimits::default()
    });
    let mut decoder = SelectDecoder::with_config(body.as_slice(), config);
    let err = decoder.next().unwrap().unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Wire(WireError::MessageTooLarge { limit: 1024, .. })
    ));
    assert_eq!(decoder.bytes_read(), 12);
}

// ── Payload and header quirks ─────────────────────────────────────────────────

#[test]
fn malformed_progress_is_invalid_payload() {
    let body = EventStreamEncoder::new()
        .add_records(b"a")
        .add_event(EventType::Progress, b"<Progress><BytesScanned>lots")
        .add_end()
        .encode()
        .unwrap();
    let output = SelectDecoder::decode(&body);
    assert_eq!(output.payload, b"a");
    let err = failed(&output);
    assert_eq!(err.kind(), ErrorKind::InvalidPayload);
    assert_snapshot!(err.to_string(), @"invalid Progress payload");
}

#[test]
fn empty_progress_is_skipped() {
    let body = EventStreamEncoder::new()
        .add_event(EventType::Progress, b"")
        .add_records(b"rows")
        .add_end()
        .encode()
        .unwrap();
    let output = SelectDecoder::decode(&body);
    assert_eq!(output.payload, b"rows");
    assert!(output.progress.is_none());
    assert!(output.is_ended());
}

#[test]
fn message_without_event_type_is_skipped() {
    let mut headers = Headers::new();
    headers.insert(":message-type", "event").unwrap();
    let body = EventStreamEncoder::new()
        .add_message(headers, b"stray")
        .add_records(b"rows")
        .add_end()
        .encode()
        .unwrap();
    let output = SelectDecoder::decode(&body);
    assert_eq!(output.payload, b"rows");
    assert!(output.is_ended());
}

#[test]
fn error_without_code_or_message_reads_empty() {
    let mut headers = Headers::new();
    headers.insert(":message-type", "error").unwrap();
    let body = EventStreamEncoder::new()
        .add_message(headers, b"")
        .encode()
        .unwrap();
    let err = SelectDecoder::decode(&body).into_result().unwrap_err();
    assert_eq!(err.server_error(), Some(("", "")));
}

#[test]
fn message_type_matches_case_insensitively() {
    let mut headers = Headers::new();
    headers.insert(":message-type", "EVENT").unwrap();
    headers.insert(":event-type", "Records").unwrap();
    let body = EventStreamEncoder::new()
        .add_message(headers, b"shouted")
        .add_end()
        .encode()
        .unwrap();
    let output = SelectDecoder::decode(&body);
    assert_eq!(output.payload, b"shouted");
    assert!(output.is_ended());
}
