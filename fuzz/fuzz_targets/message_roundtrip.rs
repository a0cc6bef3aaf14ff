#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use s3select_decoder::SelectDecoder;
use s3select_encoder::EventStreamEncoder;

#[derive(Arbitrary, Debug)]
enum Step {
    Records(Vec<u8>),
    Cont,
    Progress(u64, u64, u64),
}

// Fuzz target: encode a stream of Records, Cont and Progress messages,
// then decode it. Records must come back concatenated in order.
fuzz_target!(|steps: Vec<Step>| {
    let mut encoder = EventStreamEncoder::new();
    let mut expected = Vec::new();
    for step in &steps {
        match step {
            Step::Records(chunk) => {
                encoder.add_records(chunk);
                expected.extend_from_slice(chunk);
            }
            Step::Cont => {
                encoder.add_cont();
            }
            Step::Progress(scanned, processed, returned) => {
                encoder.add_progress(s3select_types::ProgressEvent {
                    bytes_scanned: *scanned,
                    bytes_processed: *processed,
                    bytes_returned: *returned,
                });
            }
        }
    }
    let body = encoder.add_end().encode().unwrap();

    let output = SelectDecoder::decode(&body);
    assert!(output.is_ended(), "{:?}", output.terminal);
    assert_eq!(output.payload, expected);
});
