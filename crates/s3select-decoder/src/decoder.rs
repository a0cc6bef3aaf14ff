use std::io::Read;
use std::iter::FusedIterator;

use s3select_wire::FrameReader;
use tokio_util::sync::CancellationToken;

use crate::config::DecoderConfig;
use crate::dispatch::{EventPayloadParser, XmlPayloadParser, decode_message};
use crate::error::DecodeError;
use crate::event::SelectEvent;
use crate::output::SelectOutput;
use crate::state::{self, DecoderState};

/// Synchronous Select response decoder: a lazy, single-pass sequence of
/// events over a byte source.
///
/// Each call to `next()` reads as many messages as it takes to produce
/// one caller-visible item:
///
///   1. **Cancellation**: if the configured token has fired, fail with
///      [`DecodeError::Cancelled`].
///   2. **Frame**: read one message and verify both checksums.
///   3. **Headers**: parse the header block.
///   4. **Dispatch**: route on `:message-type` / `:event-type`. Records,
///      Progress, Stats, and End are yielded; Cont, empty, and unknown
///      events are skipped; an error message ends the decode.
///
/// After End or any error, the iterator is exhausted and the source is
/// never touched again, so bytes following the End message stay unread.
/// A source that runs dry before End yields
/// [`DecodeError::MissingEndEvent`].
///
/// # Example
///
/// ```rust
/// use s3select_decoder::{SelectDecoder, SelectEvent};
/// use s3select_encoder::EventStreamEncoder;
///
/// let body = EventStreamEncoder::new()
///     .add_records(b"hello, ")
///     .add_cont()
///     .add_records(b"world")
///     .add_end()
///     .encode()
///     .unwrap();
///
/// let events: Vec<_> = SelectDecoder::new(body.as_slice())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(events.len(), 3);
/// assert_eq!(events[2], SelectEvent::End);
///
/// let output = SelectDecoder::decode(&body);
/// assert_eq!(output.payload, b"hello, world");
/// ```
pub struct SelectDecoder<R, P = XmlPayloadParser> {
    frames: FrameReader<R>,
    parser: P,
    cancellation: Option<CancellationToken>,
    state: DecoderState,
    messages_read: u64,
}

impl<R: Read> SelectDecoder<R> {
    /// Decode `reader` with default limits and no cancellation.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, DecoderConfig::default())
    }

    pub fn with_config(reader: R, config: DecoderConfig) -> Self {
        Self::with_parser(reader, config, XmlPayloadParser)
    }
}

impl<'a> SelectDecoder<&'a [u8]> {
    /// Decode a complete in-memory response body into a [`SelectOutput`].
    ///
    /// Never panics and never returns early: a failure is recorded in
    /// [`SelectOutput::terminal`] alongside everything decoded before it.
    #[must_use]
    pub fn decode(body: &'a [u8]) -> SelectOutput {
        Self::new(body).into_output()
    }
}

impl<R: Read, P: EventPayloadParser> SelectDecoder<R, P> {
    /// Decode with a custom Progress/Stats payload parser.
    pub fn with_parser(reader: R, config: DecoderConfig, parser: P) -> Self {
        Self {
            frames: FrameReader::with_limits(reader, config.limits),
            parser,
            cancellation: config.cancellation,
            state: DecoderState::Reading,
            messages_read: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Messages consumed so far, including skipped ones.
    #[must_use]
    pub fn messages_read(&self) -> u64 {
        self.messages_read
    }

    /// Offset of the next unread byte in the source.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.frames.bytes_read()
    }

    /// Drain the remaining events into a [`SelectOutput`].
    #[must_use]
    pub fn into_output(self) -> SelectOutput {
        SelectOutput::from_events(self)
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

impl<R: Read, P: EventPayloadParser> Iterator for SelectDecoder<R, P> {
    type Item = Result<SelectEvent, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.state == DecoderState::Reading {
            if self.is_cancelled() {
                return Some(Err(state::fail(&mut self.state, DecodeError::Cancelled)));
            }

            let raw = match self.frames.read_message() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    return Some(Err(state::fail(
                        &mut self.state,
                        DecodeError::MissingEndEvent,
                    )));
                }
                Err(e) => return Some(Err(state::fail(&mut self.state, e.into()))),
            };
            self.messages_read += 1;

            let outcome = decode_message(raw, &self.parser);
            if let Some(item) = state::settle(&mut self.state, outcome) {
                return Some(item);
            }
        }
        None
    }
}

impl<R: Read, P: EventPayloadParser> FusedIterator for SelectDecoder<R, P> {}
