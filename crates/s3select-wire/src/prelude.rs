use crate::checksum;
use crate::endian::read_u32_be;
use crate::error::{ChecksumKind, Section, WireError};

/// Size of the prelude: `total_len` (u32) + `headers_len` (u32).
pub const PRELUDE_LEN: usize = 8;

/// Size of each CRC32 field.
pub const CRC_LEN: usize = 4;

/// Prelude plus its checksum: the fixed 12-byte head of every message.
pub const PRELUDE_BLOCK_LEN: usize = PRELUDE_LEN + CRC_LEN;

/// Bytes of every message that are neither headers nor payload
/// (prelude, prelude CRC, message CRC).
pub const MESSAGE_OVERHEAD: u32 = 16;

/// Default ceiling on a single message: 16 MiB.
pub const DEFAULT_MAX_MESSAGE_LEN: u32 = 16 * 1024 * 1024;

/// Default ceiling on a header block: 128 KiB.
pub const DEFAULT_MAX_HEADERS_LEN: u32 = 128 * 1024;

/// Upper bounds applied to prelude lengths before any allocation.
///
/// A corrupt or hostile prelude can claim up to 4 GiB. The limits turn
/// such a claim into a [`WireError::MessageTooLarge`] instead of an
/// allocation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLimits {
    pub max_message_len: u32,
    pub max_headers_len: u32,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            max_headers_len: DEFAULT_MAX_HEADERS_LEN,
        }
    }
}

/// Message prelude: the first 8 bytes of every event-stream message.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────────────┐
/// │ Offset │ Size    │ Description                              │
/// ├────────┼─────────┼──────────────────────────────────────────┤
/// │ 0x00   │ 4 bytes │ total_len   (u32 BE, whole message)      │
/// │ 0x04   │ 4 bytes │ headers_len (u32 BE, header block only)  │
/// │ 0x08   │ 4 bytes │ CRC32 of bytes 0x00..0x08                │
/// └────────┴─────────┴──────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prelude {
    pub total_len: u32,
    pub headers_len: u32,
}

impl Prelude {
    /// Build the prelude for a message with the given section sizes.
    ///
    /// # Errors
    ///
    /// [`WireError::MessageLengthOverflow`] if the message would not fit a
    /// u32 length.
    pub fn for_lengths(headers_len: usize, payload_len: usize) -> Result<Self, WireError> {
        let total = headers_len
            .checked_add(payload_len)
            .and_then(|n| n.checked_add(MESSAGE_OVERHEAD as usize))
            .ok_or(WireError::MessageLengthOverflow { len: usize::MAX })?;
        let total_len =
            u32::try_from(total).map_err(|_| WireError::MessageLengthOverflow { len: total })?;
        let headers_len = u32::try_from(headers_len)
            .map_err(|_| WireError::MessageLengthOverflow { len: total })?;
        Ok(Self {
            total_len,
            headers_len,
        })
    }

    /// Length of the payload section.
    ///
    /// Saturates to 0 for a prelude that has not passed
    /// [`validate`](Self::validate).
    #[must_use]
    pub fn payload_len(self) -> u32 {
        self.total_len
            .saturating_sub(self.headers_len)
            .saturating_sub(MESSAGE_OVERHEAD)
    }

    #[must_use]
    pub fn to_bytes(self) -> [u8; PRELUDE_LEN] {
        let mut buf = [0u8; PRELUDE_LEN];
        buf[0..4].copy_from_slice(&self.total_len.to_be_bytes());
        buf[4..8].copy_from_slice(&self.headers_len.to_be_bytes());
        buf
    }

    /// Check the length arithmetic and the configured limits.
    ///
    /// # Errors
    ///
    /// - [`WireError::InvalidLength`] if `total_len < 16` or the header block
    ///   does not fit, i.e. the payload length would be negative.
    /// - [`WireError::MessageTooLarge`] / [`WireError::HeadersTooLarge`] if
    ///   a limit is exceeded.
    pub fn validate(self, limits: &FrameLimits) -> Result<(), WireError> {
        let fits = self
            .total_len
            .checked_sub(MESSAGE_OVERHEAD)
            .is_some_and(|room| self.headers_len <= room);
        if !fits {
            return Err(WireError::InvalidLength {
                total_len: self.total_len,
                headers_len: self.headers_len,
            });
        }
        if self.total_len > limits.max_message_len {
            return Err(WireError::MessageTooLarge {
                total_len: self.total_len,
                limit: limits.max_message_len,
            });
        }
        if self.headers_len > limits.max_headers_len {
            return Err(WireError::HeadersTooLarge {
                headers_len: self.headers_len,
                limit: limits.max_headers_len,
            });
        }
        Ok(())
    }

    /// Parse and verify the 12-byte prelude block.
    ///
    /// The prelude CRC is verified before the lengths are trusted, so a
    /// flipped bit in either length field is reported as a checksum
    /// mismatch rather than as a bogus read size.
    ///
    /// # Returns
    ///
    /// The prelude and the prelude CRC exactly as found on the wire.
    ///
    /// # Errors
    ///
    /// - [`WireError::ShortRead`] if `buf` holds fewer than 12 bytes.
    /// - [`WireError::ChecksumMismatch`] with [`ChecksumKind::Prelude`].
    /// - Any error from [`validate`](Self::validate).
    pub fn read_from(buf: &[u8], limits: &FrameLimits) -> Result<(Self, u32), WireError> {
        let total_len = read_u32_be(buf, 0, Section::Prelude)?;
        let headers_len = read_u32_be(buf, 4, Section::Prelude)?;
        let expected = read_u32_be(buf, PRELUDE_LEN, Section::PreludeChecksum)?;

        let computed = checksum::prelude_checksum(&buf[..PRELUDE_LEN]);
        if computed != expected {
            return Err(WireError::ChecksumMismatch {
                kind: ChecksumKind::Prelude,
                expected,
                computed,
            });
        }

        let prelude = Self {
            total_len,
            headers_len,
        };
        prelude.validate(limits)?;
        Ok((prelude, expected))
    }
}

/// The error for a source that ran dry after `filled` bytes of the
/// 12-byte prelude block.
#[must_use]
pub fn partial_prelude_error(filled: usize) -> WireError {
    if filled < PRELUDE_LEN {
        WireError::ShortRead {
            section: Section::Prelude,
            needed: PRELUDE_LEN,
        }
    } else {
        WireError::ShortRead {
            section: Section::PreludeChecksum,
            needed: CRC_LEN,
        }
    }
}
