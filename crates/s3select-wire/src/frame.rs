use std::io::{ErrorKind, Read, Write};

use tracing::trace;

use crate::checksum;
use crate::error::{Section, WireError};
use crate::headers::Headers;
use crate::prelude::{CRC_LEN, FrameLimits, PRELUDE_BLOCK_LEN, Prelude, partial_prelude_error};

/// One event-stream message as it appears on the wire, before its
/// headers are interpreted.
///
/// ```text
/// ┌──────────────────────────────────────────────────────────┐
/// │ prelude       total_len (u32 BE) + headers_len (u32 BE)  │
/// │ prelude_crc   CRC32 of the prelude            (u32 BE)   │
/// │ headers       [headers_len bytes]                        │
/// │ payload       [total_len - headers_len - 16 bytes]       │
/// │ message_crc   CRC32 of everything above       (u32 BE)   │
/// └──────────────────────────────────────────────────────────┘
/// ```
///
/// A `RawMessage` returned by [`FrameReader::read_message`] has already
/// passed both checksum checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawMessage {
    pub prelude: Prelude,
    pub prelude_crc: u32,
    pub headers: Vec<u8>,
    pub payload: Vec<u8>,
    pub message_crc: u32,
}

impl RawMessage {
    /// Assemble a message from headers and payload, computing both
    /// lengths and both checksums.
    ///
    /// # Errors
    ///
    /// - [`WireError::HeaderNameTooLong`] / [`WireError::HeaderValueTooLong`]
    ///   from header encoding.
    /// - [`WireError::MessageLengthOverflow`] if the message exceeds 4 GiB.
    pub fn build(headers: &Headers, payload: Vec<u8>) -> Result<Self, WireError> {
        let mut header_bytes = Vec::with_capacity(headers.encoded_len());
        headers.write_to(&mut header_bytes)?;

        let prelude = Prelude::for_lengths(header_bytes.len(), payload.len())?;
        let prelude_crc = checksum::prelude_checksum(&prelude.to_bytes());

        let mut raw = Self {
            prelude,
            prelude_crc,
            headers: header_bytes,
            payload,
            message_crc: 0,
        };
        raw.message_crc = checksum::message_checksum(&raw);
        Ok(raw)
    }

    /// Total size on the wire, equal to `prelude.total_len` for any
    /// well-formed message.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        PRELUDE_BLOCK_LEN + self.headers.len() + self.payload.len() + CRC_LEN
    }

    /// Write the exact wire bytes.
    ///
    /// # Returns
    ///
    /// Number of bytes written.
    ///
    /// # Errors
    ///
    /// [`WireError::Io`] from the writer.
    pub fn write_to(&self, w: &mut impl Write) -> Result<usize, WireError> {
        w.write_all(&self.prelude.to_bytes())?;
        w.write_all(&self.prelude_crc.to_be_bytes())?;
        w.write_all(&self.headers)?;
        w.write_all(&self.payload)?;
        w.write_all(&self.message_crc.to_be_bytes())?;
        Ok(self.encoded_len())
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&self.prelude.to_bytes());
        buf.extend_from_slice(&self.prelude_crc.to_be_bytes());
        buf.extend_from_slice(&self.headers);
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&self.message_crc.to_be_bytes());
        buf
    }

    /// Decode the header block.
    ///
    /// # Errors
    ///
    /// See [`Headers::parse`].
    pub fn parse_headers(&self) -> Result<Headers, WireError> {
        Headers::parse(&self.headers)
    }
}

/// Encode one complete message.
///
/// # Errors
///
/// See [`RawMessage::build`].
pub fn encode_message(headers: &Headers, payload: &[u8]) -> Result<Vec<u8>, WireError> {
    RawMessage::build(headers, payload.to_vec()).map(|raw| raw.to_bytes())
}

/// Pulls whole, checksum-verified messages from a byte source.
///
/// Each call to [`read_message`](Self::read_message) consumes exactly one
/// message: 12 bytes of prelude block, `headers_len` bytes, the payload,
/// then the 4-byte message checksum. Nothing beyond the current message
/// is read, so bytes following a terminal message stay in the source.
///
/// # Usage pattern
///
/// ```text
///   let mut frames = FrameReader::new(body);
///   while let Some(raw) = frames.read_message()? {
///       let headers = raw.parse_headers()?;
///       // dispatch on headers...
///   }
/// ```
pub struct FrameReader<R> {
    reader: R,
    limits: FrameLimits,
    bytes_read: u64,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, FrameLimits::default())
    }

    pub fn with_limits(reader: R, limits: FrameLimits) -> Self {
        Self {
            reader,
            limits,
            bytes_read: 0,
        }
    }

    /// Bytes consumed from the source so far, i.e. the offset of the next
    /// message.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    #[must_use]
    pub fn limits(&self) -> &FrameLimits {
        &self.limits
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read and verify the next message.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the source is exhausted exactly on a message
    /// boundary, otherwise the next message with both checksums verified.
    ///
    /// # Errors
    ///
    /// - [`WireError::ShortRead`] if the source ends inside a message.
    /// - [`WireError::ChecksumMismatch`] for either checksum.
    /// - [`WireError::InvalidLength`], [`WireError::MessageTooLarge`],
    ///   [`WireError::HeadersTooLarge`] from the prelude, raised before the
    ///   headers or payload are read.
    /// - [`WireError::Io`] from the source.
    pub fn read_message(&mut self) -> Result<Option<RawMessage>, WireError> {
        let mut head = [0u8; PRELUDE_BLOCK_LEN];
        let filled = self.fill(&mut head)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < PRELUDE_BLOCK_LEN {
            return Err(partial_prelude_error(filled));
        }

        let (prelude, prelude_crc) = Prelude::read_from(&head, &self.limits)?;
        let headers = self.read_section(prelude.headers_len as usize, Section::Headers)?;
        let payload = self.read_section(prelude.payload_len() as usize, Section::Payload)?;

        let mut crc = [0u8; CRC_LEN];
        self.read_exact_section(&mut crc, Section::MessageChecksum)?;

        let raw = RawMessage {
            prelude,
            prelude_crc,
            headers,
            payload,
            message_crc: u32::from_be_bytes(crc),
        };
        checksum::verify_message(&raw)?;

        trace!(
            total_len = prelude.total_len,
            headers_len = prelude.headers_len,
            offset = self.bytes_read - u64::from(prelude.total_len),
            "read event-stream message"
        );
        Ok(Some(raw))
    }

    fn read_section(&mut self, len: usize, section: Section) -> Result<Vec<u8>, WireError> {
        let mut buf = vec![0u8; len];
        self.read_exact_section(&mut buf, section)?;
        Ok(buf)
    }

    fn read_exact_section(&mut self, buf: &mut [u8], section: Section) -> Result<(), WireError> {
        if self.fill(buf)? < buf.len() {
            return Err(WireError::ShortRead {
                section,
                needed: buf.len(),
            });
        }
        Ok(())
    }

    /// Read until `buf` is full or the source is exhausted.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, WireError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.bytes_read += filled as u64;
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChecksumKind;

    fn message(event_type: &str, payload: &[u8]) -> Vec<u8> {
        let mut headers = Headers::new();
        headers.insert(":message-type", "event").unwrap();
        headers.insert(":event-type", event_type).unwrap();
        encode_message(&headers, payload).unwrap()
    }

    #[test]
    fn roundtrip_single_message() {
        let bytes = message("Records", b"hello");
        let mut reader = FrameReader::new(bytes.as_slice());
        let raw = reader.read_message().unwrap().unwrap();

        assert_eq!(raw.payload, b"hello");
        assert_eq!(raw.prelude.total_len as usize, bytes.len());
        assert_eq!(raw.to_bytes(), bytes);
        assert_eq!(raw.parse_headers().unwrap().get(":event-type"), Some("Records"));
        assert_eq!(reader.bytes_read(), bytes.len() as u64);
        assert!(reader.read_message().unwrap().is_none());
    }

    #[test]
    fn write_to_matches_to_bytes() {
        let raw = RawMessage::build(&Headers::new(), b"xyz".to_vec()).unwrap();
        let mut out = Vec::new();
        let n = raw.write_to(&mut out).unwrap();
        assert_eq!(n, out.len());
        assert_eq!(out, raw.to_bytes());
    }

    #[test]
    fn empty_message_is_sixteen_bytes() {
        let bytes = encode_message(&Headers::new(), &[]).unwrap();
        assert_eq!(bytes.len(), 16);
        let raw = FrameReader::new(bytes.as_slice())
            .read_message()
            .unwrap()
            .unwrap();
        assert!(raw.headers.is_empty());
        assert!(raw.payload.is_empty());
    }

    #[test]
    fn sequential_messages_in_order() {
        let mut bytes = message("Records", b"first");
        bytes.extend(message("Records", b"second"));
        bytes.extend(message("End", b""));

        let mut reader = FrameReader::new(bytes.as_slice());
        let payloads: Vec<_> = std::iter::from_fn(|| reader.read_message().unwrap())
            .map(|raw| raw.payload)
            .collect();
        assert_eq!(payloads, [b"first".to_vec(), b"second".to_vec(), Vec::new()]);
    }

    #[test]
    fn truncation_in_every_section() {
        let bytes = message("Records", b"payload");
        let headers_len = bytes.len() - 16 - b"payload".len();
        let cases = [
            (4, Section::Prelude),
            (10, Section::PreludeChecksum),
            (12 + headers_len / 2, Section::Headers),
            (12 + headers_len + 3, Section::Payload),
            (bytes.len() - 1, Section::MessageChecksum),
        ];
        for (cut, expected) in cases {
            let err = FrameReader::new(&bytes[..cut]).read_message().unwrap_err();
            assert!(
                matches!(err, WireError::ShortRead { section, .. } if section == expected),
                "cut at {cut}: expected {expected}, got {err:?}"
            );
        }
    }

    #[test]
    fn corrupt_payload_is_message_mismatch() {
        let mut bytes = message("Records", b"payload");
        let idx = bytes.len() - 6;
        bytes[idx] ^= 0x20;
        let err = FrameReader::new(bytes.as_slice()).read_message().unwrap_err();
        assert!(matches!(
            err,
            WireError::ChecksumMismatch {
                kind: ChecksumKind::Message,
                ..
            }
        ));
    }

    #[test]
    fn limits_applied_before_reading_body() {
        let bytes = message("Records", &[0u8; 64]);
        let limits = FrameLimits {
            max_message_len: 32,
            ..FrameLimits::default()
        };
        let mut reader = FrameReader::with_limits(bytes.as_slice(), limits);
        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, WireError::MessageTooLarge { limit: 32, .. }));
        assert_eq!(reader.bytes_read(), PRELUDE_BLOCK_LEN as u64);
    }

    #[test]
    fn interrupted_reads_are_retried() {
        struct Flaky<'a> {
            inner: &'a [u8],
            interrupt: bool,
        }
        impl Read for Flaky<'_> {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                self.interrupt = !self.interrupt;
                if self.interrupt {
                    return Err(ErrorKind::Interrupted.into());
                }
                // one byte at a time to exercise partial fills
                let n = buf.len().min(1).min(self.inner.len());
                buf[..n].copy_from_slice(&self.inner[..n]);
                self.inner = &self.inner[n..];
                Ok(n)
            }
        }

        let bytes = message("Records", b"slow");
        let raw = FrameReader::new(Flaky {
            inner: &bytes,
            interrupt: false,
        })
        .read_message()
        .unwrap()
        .unwrap();
        assert_eq!(raw.payload, b"slow");
    }
}
