#![no_main]

use libfuzzer_sys::fuzz_target;
use s3select_wire::FrameLimits;
use s3select_wire::prelude::{MESSAGE_OVERHEAD, PRELUDE_BLOCK_LEN, Prelude};

// Fuzz target: prelude validation.
//
// An accepted prelude always leaves room for its headers and framing.
fuzz_target!(|data: &[u8]| {
    if data.len() < PRELUDE_BLOCK_LEN {
        return;
    }
    if let Ok((prelude, _crc)) = Prelude::read_from(data, &FrameLimits::default()) {
        assert!(prelude.total_len >= prelude.headers_len + MESSAGE_OVERHEAD);
        assert_eq!(
            prelude.total_len,
            prelude.headers_len + prelude.payload_len() + MESSAGE_OVERHEAD
        );
    }
});
