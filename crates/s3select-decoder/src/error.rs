use std::fmt;

use s3select_types::{EventType, TypeError};
use s3select_wire::WireError;

/// Errors that end a Select response decode.
///
/// Every variant is terminal: once one is returned the decoder is in
/// [`DecoderState::Failed`](crate::DecoderState::Failed) and reads nothing
/// further. Records, Progress, and Stats seen before the failure are
/// still delivered to the caller.
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── Wire(WireError)        ← framing, checksum, or header failure
///   ├── Server                 ← :message-type = error from the server
///   ├── InvalidEventPayload    ← Progress/Stats body is not valid XML
///   ├── MissingEndEvent        ← source exhausted before an End event
///   └── Cancelled              ← the cancellation token fired
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A message failed framing, checksum, or header parsing.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The server reported an error in-band.
    ///
    /// `code` and `message` are the `:error-code` and `:error-message`
    /// header values, verbatim. A missing header reads as empty.
    #[error("server error {code}: {message}")]
    Server { code: String, message: String },

    /// A Progress or Stats payload could not be mapped.
    #[error("invalid {event} payload")]
    InvalidEventPayload {
        event: EventType,
        #[source]
        source: TypeError,
    },

    /// The source ended on a message boundary without an End event.
    ///
    /// The stream was cut short; the Records received so far may be
    /// incomplete.
    #[error("event stream ended without an End event")]
    MissingEndEvent,

    #[error("decode cancelled")]
    Cancelled,
}

/// Coarse classification of a [`DecodeError`], for callers that branch
/// on the failure category rather than the exact cause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Short read, inconsistent lengths, limits, malformed headers, or a
    /// stream that stopped before End.
    Framing,
    ChecksumMismatch,
    UnsupportedHeaderValueType,
    ServerReported,
    InvalidPayload,
    Cancelled,
    Io,
}

impl DecodeError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Wire(WireError::ChecksumMismatch { .. }) => ErrorKind::ChecksumMismatch,
            Self::Wire(WireError::UnsupportedHeaderValueType { .. }) => {
                ErrorKind::UnsupportedHeaderValueType
            }
            Self::Wire(WireError::Io(_)) => ErrorKind::Io,
            Self::Wire(_) | Self::MissingEndEvent => ErrorKind::Framing,
            Self::Server { .. } => ErrorKind::ServerReported,
            Self::InvalidEventPayload { .. } => ErrorKind::InvalidPayload,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// The server's code and message, for [`DecodeError::Server`].
    #[must_use]
    pub fn server_error(&self) -> Option<(&str, &str)> {
        match self {
            Self::Server { code, message } => Some((code, message)),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Framing => "framing",
            Self::ChecksumMismatch => "checksum mismatch",
            Self::UnsupportedHeaderValueType => "unsupported header value type",
            Self::ServerReported => "server reported",
            Self::InvalidPayload => "invalid payload",
            Self::Cancelled => "cancelled",
            Self::Io => "io",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s3select_wire::{ChecksumKind, Section};

    #[test]
    fn wire_errors_classified() {
        let cases = [
            (
                WireError::ShortRead {
                    section: Section::Payload,
                    needed: 4,
                },
                ErrorKind::Framing,
            ),
            (
                WireError::InvalidLength {
                    total_len: 10,
                    headers_len: 0,
                },
                ErrorKind::Framing,
            ),
            (
                WireError::ChecksumMismatch {
                    kind: ChecksumKind::Message,
                    expected: 1,
                    computed: 2,
                },
                ErrorKind::ChecksumMismatch,
            ),
            (
                WireError::UnsupportedHeaderValueType {
                    name: "x".into(),
                    value_type: 0,
                },
                ErrorKind::UnsupportedHeaderValueType,
            ),
            (
                WireError::Io(std::io::Error::other("reset")),
                ErrorKind::Io,
            ),
        ];
        for (wire, kind) in cases {
            assert_eq!(DecodeError::from(wire).kind(), kind);
        }
    }

    #[test]
    fn decoder_errors_classified() {
        assert_eq!(DecodeError::MissingEndEvent.kind(), ErrorKind::Framing);
        assert_eq!(DecodeError::Cancelled.kind(), ErrorKind::Cancelled);
        let server = DecodeError::Server {
            code: "InvalidRequest".into(),
            message: "bad query".into(),
        };
        assert_eq!(server.kind(), ErrorKind::ServerReported);
        assert_eq!(server.server_error(), Some(("InvalidRequest", "bad query")));
        assert_eq!(server.to_string(), "server error InvalidRequest: bad query");
    }

    #[test]
    fn payload_error_keeps_source() {
        let err = DecodeError::InvalidEventPayload {
            event: EventType::Stats,
            source: TypeError::Xml("unexpected end".into()),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidPayload);
        assert_eq!(err.to_string(), "invalid Stats payload");
        assert!(std::error::Error::source(&err).is_some());
    }
}
