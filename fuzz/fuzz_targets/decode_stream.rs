#![no_main]

use libfuzzer_sys::fuzz_target;
use s3select_decoder::{SelectDecoder, Terminal};

// Fuzz target: full Select decode of an arbitrary response body.
//
// Covers framing, both checksums, header parsing, dispatch and the
// Progress/Stats XML mapping. The decode must settle on End or an error.
fuzz_target!(|data: &[u8]| {
    let output = SelectDecoder::decode(data);
    assert!(!matches!(output.terminal, Terminal::Reading));
});
