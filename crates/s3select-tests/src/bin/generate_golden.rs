//! Golden fixture generator for the s3select integration suite.
//!
//! Writes every fixture under `tests/golden/`. Run it after changing the
//! encoder or adding a fixture; the `.bin` files are committed.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_golden -p s3select-tests
//! ```
//!
//! # Generated fixtures
//!
//! | Directory                          | Contents                                         |
//! |------------------------------------|--------------------------------------------------|
//! | scenario_a                         | Records("hello, ") + Records("world") + End      |
//! | scenario_b                         | Progress + Stats + End                           |
//! | scenario_c                         | Error(InvalidRequest) + Records + End            |
//! | interleaved                        | Cont, Records, Progress, unknown, empty, Stats   |
//! | edge_cases/trailing_after_end      | scenario_a + 18 bytes of garbage                 |
//! | edge_cases/truncated               | scenario_a minus its last 3 bytes                |
//! | edge_cases/bad_message_crc         | scenario_a, first payload byte flipped           |
//! | edge_cases/unsupported_value_type  | Handcrafted: header value type 6                 |
//! | edge_cases/duplicate_header        | Handcrafted: `:event-type` twice                 |
//! | edge_cases/negative_payload        | Handcrafted: total=20, headers=10                |

#![allow(clippy::pedantic)]

use std::path::Path;

use s3select_encoder::EventStreamEncoder;
use s3select_types::EventType;
use s3select_wire::prelude::Prelude;
use s3select_wire::{Headers, checksum, encode_message};

/// Progress document as a server sends it, declaration included.
pub const PROGRESS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Progress><BytesScanned>100</BytesScanned><BytesProcessed>200</BytesProcessed><BytesReturned>12</BytesReturned></Progress>"#;

pub const STATS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Stats><BytesScanned>512</BytesScanned><BytesProcessed>1024</BytesProcessed><BytesReturned>12</BytesReturned></Stats>"#;

/// Header bytes of an encoded Records message.
const RECORDS_HEADERS_LEN: usize = 85;

fn main() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let golden_dir = manifest_dir.join("tests/golden");

    let scenario_a = scenario_a();
    write_fixture(&golden_dir, "scenario_a", &scenario_a);
    write_fixture(&golden_dir, "scenario_b", &scenario_b());
    write_fixture(&golden_dir, "scenario_c", &scenario_c());
    write_fixture(&golden_dir, "interleaved", &interleaved());
    generate_edge_cases(&golden_dir, &scenario_a);

    println!("All golden fixtures written to {}", golden_dir.display());
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write_fixture(golden_dir: &Path, name: &str, data: &[u8]) {
    let path = golden_dir.join(name).join("stream.bin");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create_dir_all");
    }
    std::fs::write(&path, data).expect("write fixture");
    println!("  wrote {} ({} bytes)", path.display(), data.len());
}

fn headers(pairs: &[(&str, &str)]) -> Headers {
    let mut h = Headers::new();
    for (name, value) in pairs {
        h.insert(*name, *value).expect("unique header names");
    }
    h
}

/// Append one encoded header with an arbitrary value-type byte.
fn raw_header(out: &mut Vec<u8>, name: &str, value_type: u8, value: &str) {
    out.push(name.len() as u8);
    out.extend_from_slice(name.as_bytes());
    out.push(value_type);
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}

/// Frame a pre-encoded header block, bypassing `Headers` validation.
fn frame_raw(header_block: &[u8], payload: &[u8]) -> Vec<u8> {
    let prelude = Prelude::for_lengths(header_block.len(), payload.len()).expect("fits");
    let mut out = prelude.to_bytes().to_vec();
    out.extend_from_slice(&checksum::prelude_checksum(&prelude.to_bytes()).to_be_bytes());
    out.extend_from_slice(header_block);
    out.extend_from_slice(payload);
    let crc = crc32(&out);
    out.extend_from_slice(&crc.to_be_bytes());
    out
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut hasher = checksum::MessageHasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

// ── Fixture generators ────────────────────────────────────────────────────────

fn scenario_a() -> Vec<u8> {
    EventStreamEncoder::new()
        .add_records(b"hello, ")
        .add_records(b"world")
        .add_end()
        .encode()
        .expect("encode scenario_a")
}

fn scenario_b() -> Vec<u8> {
    EventStreamEncoder::new()
        .add_event(EventType::Progress, PROGRESS_XML.as_bytes())
        .add_event(EventType::Stats, STATS_XML.as_bytes())
        .add_end()
        .encode()
        .expect("encode scenario_b")
}

fn scenario_c() -> Vec<u8> {
    EventStreamEncoder::new()
        .add_error("InvalidRequest", "bad query")
        .add_records(b"never")
        .add_end()
        .encode()
        .expect("encode scenario_c")
}

fn interleaved() -> Vec<u8> {
    EventStreamEncoder::new()
        .add_cont()
        .add_records(b"id,name\n")
        .add_event(EventType::Progress, PROGRESS_XML.as_bytes())
        .add_records(b"1,alice\n")
        .add_event(EventType::Unknown("Telemetry".into()), b"<Telemetry/>")
        .add_cont()
        .add_records(b"")
        .add_records(b"2,bob\n")
        .add_event(EventType::Stats, STATS_XML.as_bytes())
        .add_end()
        .encode()
        .expect("encode interleaved")
}

fn generate_edge_cases(golden_dir: &Path, scenario_a: &[u8]) {
    let mut trailing = scenario_a.to_vec();
    trailing.extend_from_slice(b"\xDE\xAD\xBE\xEF not a message");
    write_fixture(golden_dir, "edge_cases/trailing_after_end", &trailing);

    write_fixture(
        golden_dir,
        "edge_cases/truncated",
        &scenario_a[..scenario_a.len() - 3],
    );

    let mut corrupt = scenario_a.to_vec();
    corrupt[12 + RECORDS_HEADERS_LEN] ^= 0x01;
    write_fixture(golden_dir, "edge_cases/bad_message_crc", &corrupt);

    let end = encode_message(
        &headers(&[(":message-type", "event"), (":event-type", "End")]),
        b"",
    )
    .expect("encode End");

    let mut block = Vec::new();
    raw_header(&mut block, ":message-type", 7, "event");
    raw_header(&mut block, ":event-type", 6, "Records");
    let mut unsupported = EventStreamEncoder::new()
        .add_records(b"ok")
        .encode()
        .expect("encode Records");
    unsupported.extend(frame_raw(&block, b"x"));
    unsupported.extend_from_slice(&end);
    write_fixture(golden_dir, "edge_cases/unsupported_value_type", &unsupported);

    let mut block = Vec::new();
    raw_header(&mut block, ":message-type", 7, "event");
    raw_header(&mut block, ":event-type", 7, "Records");
    raw_header(&mut block, ":event-type", 7, "End");
    let mut duplicate = frame_raw(&block, b"x");
    duplicate.extend_from_slice(&end);
    write_fixture(golden_dir, "edge_cases/duplicate_header", &duplicate);

    let prelude = Prelude {
        total_len: 20,
        headers_len: 10,
    };
    let mut negative = prelude.to_bytes().to_vec();
    negative.extend_from_slice(&checksum::prelude_checksum(&prelude.to_bytes()).to_be_bytes());
    negative.extend_from_slice(&[0u8; 8]);
    write_fixture(golden_dir, "edge_cases/negative_payload", &negative);
}
