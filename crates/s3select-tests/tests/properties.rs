//! Property tests over generated messages and streams.
//!
//! - Any header block and payload survive encode then [`FrameReader`]
//!   unchanged, and the prelude lengths add up.
//! - Any sequence of Records chunks decodes to their concatenation, in
//!   order, regardless of interleaved Cont and Progress messages.
//! - Arbitrary bytes never panic the decoder.

use std::collections::BTreeMap;

use proptest::prelude::*;
use s3select_decoder::{SelectDecoder, SelectOutput};
use s3select_encoder::EventStreamEncoder;
use s3select_types::ProgressEvent;
use s3select_wire::prelude::MESSAGE_OVERHEAD;
use s3select_wire::{FrameReader, Headers, encode_message};

fn headers_strategy() -> impl Strategy<Value = Headers> {
    prop::collection::btree_map("[a-z:-]{1,24}", "[ -~]{0,48}", 0..6).prop_map(
        |pairs: BTreeMap<String, String>| {
            let mut headers = Headers::new();
            for (name, value) in pairs {
                headers.insert(name, value).expect("btree keys are unique");
            }
            headers
        },
    )
}

#[derive(Clone, Debug)]
enum Step {
    Records(Vec<u8>),
    Cont,
    Progress(u64),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => prop::collection::vec(any::<u8>(), 0..256).prop_map(Step::Records),
        1 => Just(Step::Cont),
        1 => any::<u64>().prop_map(Step::Progress),
    ]
}

proptest! {
    #[test]
    fn message_survives_framing(
        headers in headers_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..1024),
    ) {
        let bytes = encode_message(&headers, &payload).unwrap();
        let mut reader = FrameReader::new(bytes.as_slice());
        let raw = reader.read_message().unwrap().expect("one message");

        prop_assert_eq!(raw.prelude.total_len as usize, bytes.len());
        prop_assert_eq!(
            raw.prelude.total_len,
            raw.prelude.headers_len + raw.prelude.payload_len() + MESSAGE_OVERHEAD
        );
        prop_assert_eq!(raw.parse_headers().unwrap(), headers);
        prop_assert_eq!(&raw.payload, &payload);
        prop_assert!(reader.read_message().unwrap().is_none());
    }

    #[test]
    fn records_concatenate_in_order(steps in prop::collection::vec(step_strategy(), 0..40)) {
        let mut encoder = EventStreamEncoder::new();
        let mut expected = Vec::new();
        let mut last_progress = None;
        for step in &steps {
            match step {
                Step::Records(chunk) => {
                    encoder.add_records(chunk);
                    expected.extend_from_slice(chunk);
                }
                Step::Cont => {
                    encoder.add_cont();
                }
                Step::Progress(scanned) => {
                    let progress = ProgressEvent {
                        bytes_scanned: *scanned,
                        ..ProgressEvent::default()
                    };
                    encoder.add_progress(progress);
                    last_progress = Some(progress);
                }
            }
        }
        encoder.add_end();

        let output = SelectDecoder::decode(&encoder.encode().unwrap());
        prop_assert!(output.is_ended());
        prop_assert_eq!(output.payload, expected);
        prop_assert_eq!(output.progress, last_progress);
    }

    #[test]
    fn arbitrary_bytes_never_panic(body in prop::collection::vec(any::<u8>(), 0..512)) {
        let output = SelectOutput::from_events(SelectDecoder::new(body.as_slice()));
        // Exhausting the source without End is itself a failure.
        prop_assert!(output.is_ended() || output.error().is_some());
    }
}
