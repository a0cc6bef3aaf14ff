use std::io::Write;

use s3select_types::protocol::{content_type, header};
use s3select_types::{EventType, ProgressEvent, StatsEvent};
use s3select_wire::{Headers, RawMessage, WireError};
use tracing::debug;

use crate::error::EncodeError;

/// Builds a well-formed Select Object Content event stream.
///
/// The decoder only ever consumes these streams; the encoder exists so
/// fixtures, benches, and the CLI `encode` command can produce them
/// without a live server. Methods append messages to an internal list
/// and return `&mut Self` for chaining. Nothing is serialized until
/// [`encode`](Self::encode).
///
/// # Usage
///
/// ```rust
/// use s3select_encoder::EventStreamEncoder;
/// use s3select_types::ProgressEvent;
///
/// let body = EventStreamEncoder::new()
///     .add_records(b"a,b\n")
///     .add_cont()
///     .add_progress(ProgressEvent { bytes_scanned: 4, ..Default::default() })
///     .add_records(b"c,d\n")
///     .add_end()
///     .encode()
///     .unwrap();
/// assert!(!body.is_empty());
/// ```
///
/// # Header layout
///
/// Event messages carry, in order:
///
/// ```text
/// ┌────────────────┬──────────────────────────────────────────────┐
/// │ :message-type  │ event                                        │
/// │ :event-type    │ Records | Cont | Progress | Stats | End | …  │
/// │ :content-type  │ only for Records (octet-stream) and          │
/// │                │ Progress/Stats (text/xml)                    │
/// └────────────────┴──────────────────────────────────────────────┘
/// ```
///
/// Error messages carry `:message-type=error`, `:error-code`, and
/// `:error-message`, with an empty payload.
#[derive(Default)]
pub struct EventStreamEncoder {
    messages: Vec<PendingMessage>,
}

/// A message recorded by the builder, rendered at encode time so that
/// header and XML failures surface from `encode()` rather than from the
/// chaining methods.
enum PendingMessage {
    Event { event_type: EventType, body: Body },
    Error { code: String, message: String },
    Raw { headers: Headers, payload: Vec<u8> },
}

enum Body {
    Bytes(Vec<u8>),
    Progress(ProgressEvent),
    Stats(StatsEvent),
}

impl EventStreamEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a Records event carrying a chunk of result bytes.
    pub fn add_records(&mut self, content: &[u8]) -> &mut Self {
        self.push_event(EventType::Records, Body::Bytes(content.to_vec()))
    }

    /// Append a Cont keep-alive event (no payload).
    pub fn add_cont(&mut self) -> &mut Self {
        self.push_event(EventType::Cont, Body::Bytes(Vec::new()))
    }

    /// Append a Progress event with an XML `<Progress>` payload.
    pub fn add_progress(&mut self, progress: ProgressEvent) -> &mut Self {
        self.push_event(EventType::Progress, Body::Progress(progress))
    }

    /// Append a Stats event with an XML `<Stats>` payload.
    pub fn add_stats(&mut self, stats: StatsEvent) -> &mut Self {
        self.push_event(EventType::Stats, Body::Stats(stats))
    }

    /// Append the terminal End event (no payload).
    pub fn add_end(&mut self) -> &mut Self {
        self.push_event(EventType::End, Body::Bytes(Vec::new()))
    }

    /// Append a server error message.
    pub fn add_error(&mut self, code: &str, message: &str) -> &mut Self {
        self.messages.push(PendingMessage::Error {
            code: code.to_owned(),
            message: message.to_owned(),
        });
        self
    }

    /// Append an event with an arbitrary type and raw payload.
    ///
    /// Known types get their usual `:content-type`; unknown ones get
    /// none. Useful for producing event types a decoder must skip.
    pub fn add_event(&mut self, event_type: EventType, payload: &[u8]) -> &mut Self {
        self.push_event(event_type, Body::Bytes(payload.to_vec()))
    }

    /// Append a message with caller-supplied headers, written verbatim.
    pub fn add_message(&mut self, headers: Headers, payload: &[u8]) -> &mut Self {
        self.messages.push(PendingMessage::Raw {
            headers,
            payload: payload.to_vec(),
        });
        self
    }

    /// Number of messages added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Serialize every message into one contiguous byte stream.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::EmptyStream`] if nothing was added.
    /// - [`EncodeError::Type`] if a Progress/Stats body fails to render.
    /// - [`EncodeError::Wire`] if a header or message exceeds its length
    ///   prefix, or raw headers repeat a name.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        self.encode_to(&mut out)?;
        Ok(out)
    }

    /// Serialize into `w`, one message at a time.
    ///
    /// # Returns
    ///
    /// Number of bytes written.
    ///
    /// # Errors
    ///
    /// As [`encode`](Self::encode), plus [`EncodeError::Io`] from `w`.
    pub fn encode_to(&self, w: &mut impl Write) -> Result<usize, EncodeError> {
        if self.messages.is_empty() {
            return Err(EncodeError::EmptyStream);
        }

        let mut written = 0;
        for message in &self.messages {
            let raw = message.build()?;
            written += raw.write_to(w).map_err(|e| match e {
                WireError::Io(io) => EncodeError::Io(io),
                other => EncodeError::Wire(other),
            })?;
        }

        debug!(messages = self.messages.len(), bytes = written, "encoded event stream");
        Ok(written)
    }

    fn push_event(&mut self, event_type: EventType, body: Body) -> &mut Self {
        self.messages
            .push(PendingMessage::Event { event_type, body });
        self
    }
}

impl PendingMessage {
    fn build(&self) -> Result<RawMessage, EncodeError> {
        match self {
            Self::Event { event_type, body } => {
                let mut headers = Headers::new();
                headers.insert(header::MESSAGE_TYPE, "event")?;
                headers.insert(header::EVENT_TYPE, event_type.as_str())?;
                if let Some(ct) = content_type_for(event_type) {
                    headers.insert(header::CONTENT_TYPE, ct)?;
                }
                let payload = match body {
                    Body::Bytes(bytes) => bytes.clone(),
                    Body::Progress(progress) => progress.to_xml()?.into_bytes(),
                    Body::Stats(stats) => stats.to_xml()?.into_bytes(),
                };
                Ok(RawMessage::build(&headers, payload)?)
            }
            Self::Error { code, message } => {
                let mut headers = Headers::new();
                headers.insert(header::MESSAGE_TYPE, "error")?;
                headers.insert(header::ERROR_CODE, code.as_str())?;
                headers.insert(header::ERROR_MESSAGE, message.as_str())?;
                Ok(RawMessage::build(&headers, Vec::new())?)
            }
            Self::Raw { headers, payload } => Ok(RawMessage::build(headers, payload.clone())?),
        }
    }
}

fn content_type_for(event_type: &EventType) -> Option<&'static str> {
    match event_type {
        EventType::Records => Some(content_type::OCTET_STREAM),
        EventType::Progress | EventType::Stats => Some(content_type::XML),
        EventType::Cont | EventType::End | EventType::Unknown(_) => None,
    }
}
