use std::fmt;

/// The part of an event-stream message a read was attempting when it
/// failed. Carried by [`WireError::ShortRead`] so a truncated body can be
/// located without a hex dump.
///
/// ```text
/// ┌──────────┬──────────────┬─────────┬─────────┬──────────────┐
/// │ Prelude  │ PreludeCrc   │ Headers │ Payload │ MessageCrc   │
/// │ 8 bytes  │ 4 bytes      │ N bytes │ M bytes │ 4 bytes      │
/// └──────────┴──────────────┴─────────┴─────────┴──────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Prelude,
    PreludeChecksum,
    Headers,
    Payload,
    MessageChecksum,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prelude => "prelude",
            Self::PreludeChecksum => "prelude checksum",
            Self::Headers => "headers",
            Self::Payload => "payload",
            Self::MessageChecksum => "message checksum",
        })
    }
}

/// Which of the two CRC32 values in a message failed verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChecksumKind {
    /// CRC32 over the 8 prelude bytes.
    Prelude,
    /// CRC32 over everything before the trailing checksum.
    Message,
}

impl fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prelude => "prelude",
            Self::Message => "message",
        })
    }
}

/// Errors raised while framing, checksumming, or parsing event-stream
/// messages.
///
/// ```text
///   WireError
///   ├── ShortRead                   ← source ended inside a message
///   ├── InvalidLength               ← prelude lengths are inconsistent
///   ├── MessageTooLarge             ← total length over the frame limit
///   ├── HeadersTooLarge             ← header block over the frame limit
///   ├── ChecksumMismatch            ← prelude or message CRC32 wrong
///   ├── UnsupportedHeaderValueType  ← header value type byte is not 7
///   ├── InvalidUtf8                 ← header name/value not UTF-8
///   ├── DuplicateHeader             ← same header name twice
///   ├── HeaderNameTooLong           ← encode side: name over 255 bytes
///   ├── HeaderValueTooLong          ← encode side: value over 65535 bytes
///   ├── MessageLengthOverflow       ← encode side: over u32::MAX bytes
///   └── Io(std::io::Error)          ← from the underlying reader/writer
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The source yielded fewer bytes than the section requires.
    #[error("short read in {section}: expected {needed} bytes")]
    ShortRead { section: Section, needed: usize },

    /// `headers_len` does not fit inside `total_len` minus the 16 bytes of
    /// prelude and checksums, which would make the payload length negative.
    #[error(
        "invalid prelude: total length {total_len} cannot hold {headers_len} header bytes and 16 bytes of framing"
    )]
    InvalidLength { total_len: u32, headers_len: u32 },

    #[error("message length {total_len} exceeds limit {limit}")]
    MessageTooLarge { total_len: u32, limit: u32 },

    #[error("header block length {headers_len} exceeds limit {limit}")]
    HeadersTooLarge { headers_len: u32, limit: u32 },

    #[error("{kind} checksum mismatch: expected {expected:#010X}, computed {computed:#010X}")]
    ChecksumMismatch {
        kind: ChecksumKind,
        expected: u32,
        computed: u32,
    },

    /// Only string values (type 7) appear in Select responses.
    #[error("unsupported value type {value_type} for header {name:?}")]
    UnsupportedHeaderValueType { name: String, value_type: u8 },

    #[error("invalid UTF-8 in header block at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("duplicate header {name:?}")]
    DuplicateHeader { name: String },

    #[error("header name is {len} bytes, limit is 255")]
    HeaderNameTooLong { len: usize },

    #[error("value of header {name:?} is {len} bytes, limit is 65535")]
    HeaderValueTooLong { name: String, len: usize },

    #[error("message of {len} bytes does not fit a 32-bit length prefix")]
    MessageLengthOverflow { len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
