#![no_main]

use libfuzzer_sys::fuzz_target;
use s3select_wire::FrameReader;

// Fuzz target: FrameReader over arbitrary bytes.
//
// Every accepted message must account for exactly the bytes consumed.
fuzz_target!(|data: &[u8]| {
    let mut reader = FrameReader::new(data);
    let mut consumed = 0u64;
    while let Ok(Some(raw)) = reader.read_message() {
        consumed += u64::from(raw.prelude.total_len);
        assert_eq!(reader.bytes_read(), consumed);
        let _ = raw.parse_headers();
    }
});
