//! Classification of checksum-verified messages.
//!
//! A message is routed by two headers. Decision order:
//!
//! ```text
//!   :message-type == error ──────────────► Err(Server { code, message })
//!   :event-type
//!     ├── End ───────────────────────────► Event(End)
//!     ├── Cont ──────────────────────────► Ignore(Continuation)
//!     ├── (any other, empty payload) ────► Ignore(EmptyPayload)
//!     ├── Progress ──────────────────────► Event(Progress)  via parser
//!     ├── Stats ─────────────────────────► Event(Stats)     via parser
//!     ├── Records ───────────────────────► Event(Records)
//!     ├── (unrecognized) ────────────────► Ignore(UnknownEvent)
//!     └── (header absent) ───────────────► Ignore(MissingEventType)
//! ```
//!
//! Header names are matched exactly; the two type values are matched
//! case-insensitively.

use s3select_types::protocol::header;
use s3select_types::{EventType, MessageType, ProgressEvent, StatsEvent, TypeError};
use s3select_wire::{Headers, RawMessage};
use tracing::trace;

use crate::error::DecodeError;
use crate::event::SelectEvent;

/// Maps Progress and Stats payloads to typed records.
///
/// The decoder treats payload mapping as an opaque function; swap the
/// implementation to decode a different body format or to stub it out
/// in tests.
pub trait EventPayloadParser {
    /// # Errors
    ///
    /// Any [`TypeError`]; the decoder reports it as
    /// [`DecodeError::InvalidEventPayload`].
    fn parse_progress(&self, payload: &[u8]) -> Result<ProgressEvent, TypeError>;

    /// # Errors
    ///
    /// As [`parse_progress`](Self::parse_progress).
    fn parse_stats(&self, payload: &[u8]) -> Result<StatsEvent, TypeError>;
}

/// The default parser: XML bodies, as sent by S3-compatible servers.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlPayloadParser;

impl EventPayloadParser for XmlPayloadParser {
    fn parse_progress(&self, payload: &[u8]) -> Result<ProgressEvent, TypeError> {
        ProgressEvent::from_xml(payload)
    }

    fn parse_stats(&self, payload: &[u8]) -> Result<StatsEvent, TypeError> {
        StatsEvent::from_xml(payload)
    }
}

/// What the decode loop should do with one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Event(SelectEvent),
    Ignore(IgnoreReason),
}

/// Why a message produced no event. Every reason is non-fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A `Cont` keep-alive.
    Continuation,
    /// A non-terminal event with a zero-length payload.
    EmptyPayload(EventType),
    /// An event type this decoder does not know.
    UnknownEvent(EventType),
    /// A non-error message without an `:event-type` header.
    MissingEventType,
}

/// Classify a message from its parsed headers and payload.
///
/// # Errors
///
/// - [`DecodeError::Server`] for an error message.
/// - [`DecodeError::InvalidEventPayload`] if `parser` rejects a Progress
///   or Stats body.
pub fn dispatch<P: EventPayloadParser + ?Sized>(
    headers: &Headers,
    payload: Vec<u8>,
    parser: &P,
) -> Result<Dispatch, DecodeError> {
    let message_type = headers.get(header::MESSAGE_TYPE).map(MessageType::parse);
    if message_type == Some(MessageType::Error) {
        return Err(DecodeError::Server {
            code: headers.get(header::ERROR_CODE).unwrap_or_default().to_owned(),
            message: headers
                .get(header::ERROR_MESSAGE)
                .unwrap_or_default()
                .to_owned(),
        });
    }

    let Some(event_type) = headers.get(header::EVENT_TYPE).map(EventType::parse) else {
        return Ok(Dispatch::Ignore(IgnoreReason::MissingEventType));
    };
    trace!(event = %event_type, payload_len = payload.len(), "dispatching message");

    match event_type {
        EventType::End => return Ok(Dispatch::Event(SelectEvent::End)),
        EventType::Cont => return Ok(Dispatch::Ignore(IgnoreReason::Continuation)),
        _ if payload.is_empty() => {
            return Ok(Dispatch::Ignore(IgnoreReason::EmptyPayload(event_type)));
        }
        _ => {}
    }

    let event = match event_type {
        EventType::Records => SelectEvent::Records(payload),
        EventType::Progress => SelectEvent::Progress(
            parser
                .parse_progress(&payload)
                .map_err(|source| DecodeError::InvalidEventPayload {
                    event: EventType::Progress,
                    source,
                })?,
        ),
        EventType::Stats => SelectEvent::Stats(parser.parse_stats(&payload).map_err(
            |source| DecodeError::InvalidEventPayload {
                event: EventType::Stats,
                source,
            },
        )?),
        other => return Ok(Dispatch::Ignore(IgnoreReason::UnknownEvent(other))),
    };
    Ok(Dispatch::Event(event))
}

/// Parse the header block of a verified message, then [`dispatch`] it.
///
/// # Errors
///
/// [`DecodeError::Wire`] if the header block is malformed, otherwise as
/// [`dispatch`].
pub fn decode_message<P: EventPayloadParser + ?Sized>(
    raw: RawMessage,
    parser: &P,
) -> Result<Dispatch, DecodeError> {
    let headers = raw.parse_headers()?;
    dispatch(&headers, raw.payload, parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_headers(event_type: &str) -> Headers {
        let mut h = Headers::new();
        h.insert(":message-type", "event").unwrap();
        h.insert(":event-type", event_type).unwrap();
        h
    }

    fn run(headers: &Headers, payload: &[u8]) -> Result<Dispatch, DecodeError> {
        dispatch(headers, payload.to_vec(), &XmlPayloadParser)
    }

    /// Parser that rejects everything, to prove when it is consulted.
    struct Refuse;

    impl EventPayloadParser for Refuse {
        fn parse_progress(&self, _: &[u8]) -> Result<ProgressEvent, TypeError> {
            Err(TypeError::Xml("refused".into()))
        }
        fn parse_stats(&self, _: &[u8]) -> Result<StatsEvent, TypeError> {
            Err(TypeError::Xml("refused".into()))
        }
    }

    #[test]
    fn records_payload_verbatim() {
        let out = run(&event_headers("Records"), b"a,b\n").unwrap();
        assert_eq!(out, Dispatch::Event(SelectEvent::Records(b"a,b\n".to_vec())));
    }

    #[test]
    fn progress_parsed_through_parser() {
        let xml = b"<Progress><BytesScanned>100</BytesScanned></Progress>";
        let Dispatch::Event(SelectEvent::Progress(p)) = run(&event_headers("Progress"), xml).unwrap()
        else {
            panic!("expected progress event");
        };
        assert_eq!(p.bytes_scanned, 100);
    }

    #[test]
    fn stats_parse_failure_is_fatal() {
        let err = dispatch(&event_headers("Stats"), b"<Stats>".to_vec(), &Refuse).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidEventPayload {
                event: EventType::Stats,
                ..
            }
        ));
    }

    #[test]
    fn error_message_wins_over_event_type() {
        let mut h = Headers::new();
        h.insert(":message-type", "Error").unwrap();
        h.insert(":event-type", "Records").unwrap();
        h.insert(":error-code", "InvalidRequest").unwrap();
        h.insert(":error-message", "bad query").unwrap();
        let err = run(&h, b"ignored").unwrap_err();
        assert_eq!(err.server_error(), Some(("InvalidRequest", "bad query")));
    }

    #[test]
    fn error_without_details_reads_empty() {
        let mut h = Headers::new();
        h.insert(":message-type", "error").unwrap();
        let err = run(&h, b"").unwrap_err();
        assert_eq!(err.server_error(), Some(("", "")));
    }

    #[test]
    fn end_and_cont_ignore_payload() {
        assert_eq!(
            run(&event_headers("end"), b"").unwrap(),
            Dispatch::Event(SelectEvent::End)
        );
        assert_eq!(
            run(&event_headers("End"), b"trailing").unwrap(),
            Dispatch::Event(SelectEvent::End)
        );
        assert_eq!(
            run(&event_headers("CONT"), b"x").unwrap(),
            Dispatch::Ignore(IgnoreReason::Continuation)
        );
    }

    #[test]
    fn empty_payload_skipped_before_parsing() {
        // The refusing parser is never reached for an empty body.
        let out = dispatch(&event_headers("Progress"), Vec::new(), &Refuse).unwrap();
        assert_eq!(
            out,
            Dispatch::Ignore(IgnoreReason::EmptyPayload(EventType::Progress))
        );
        assert_eq!(
            run(&event_headers("Records"), b"").unwrap(),
            Dispatch::Ignore(IgnoreReason::EmptyPayload(EventType::Records))
        );
    }

    #[test]
    fn unknown_event_ignored() {
        assert_eq!(
            run(&event_headers("RequestLevelStats"), b"<x/>").unwrap(),
            Dispatch::Ignore(IgnoreReason::UnknownEvent(EventType::Unknown(
                "RequestLevelStats".into()
            )))
        );
    }

    #[test]
    fn missing_event_type_ignored() {
        let mut h = Headers::new();
        h.insert(":message-type", "event").unwrap();
        assert_eq!(
            run(&h, b"x").unwrap(),
            Dispatch::Ignore(IgnoreReason::MissingEventType)
        );
    }

    #[test]
    fn header_names_match_exactly() {
        let mut h = Headers::new();
        h.insert(":Event-Type", "Records").unwrap();
        assert_eq!(
            run(&h, b"x").unwrap(),
            Dispatch::Ignore(IgnoreReason::MissingEventType)
        );
    }
}
