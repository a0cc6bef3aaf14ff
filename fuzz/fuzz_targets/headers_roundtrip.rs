#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use s3select_wire::{Headers, parse_headers};

#[derive(Arbitrary, Debug)]
struct Input {
    headers: Vec<(String, String)>,
}

// Fuzz target: Headers build -> write -> parse roundtrip.
//
// Names that repeat or exceed the wire limits are rejected at insert
// time; whatever was accepted must parse back unchanged.
fuzz_target!(|input: Input| {
    let mut headers = Headers::new();
    for (name, value) in input.headers {
        let _ = headers.insert(name, value);
    }

    let mut buf = Vec::new();
    if headers.write_to(&mut buf).is_err() {
        return;
    }
    assert_eq!(buf.len(), headers.encoded_len());
    assert_eq!(parse_headers(&buf).unwrap(), headers);
});
