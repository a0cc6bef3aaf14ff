#![no_main]

use libfuzzer_sys::fuzz_target;
use s3select_wire::parse_headers;

// Fuzz target: header block parsing.
//
// A parsed block must re-encode to the exact input bytes.
fuzz_target!(|data: &[u8]| {
    if let Ok(headers) = parse_headers(data) {
        let mut out = Vec::new();
        headers.write_to(&mut out).unwrap();
        assert_eq!(out, data);
    }
});
