//! CRC32 validation of event-stream messages.
//!
//! Both checksums use the standard CRC-32 (ISO-HDLC / ISO 3309,
//! reflected polynomial `0xEDB88320`), which is what `crc32fast` computes.
//! The checks cover the opaque bytes; nothing is interpreted until both
//! have passed.

use crate::error::{ChecksumKind, WireError};
use crate::frame::RawMessage;

/// CRC32 over the 8 prelude bytes.
#[must_use]
pub fn prelude_checksum(prelude: &[u8]) -> u32 {
    crc32fast::hash(prelude)
}

/// Incremental CRC32 over a message's sections, in wire order.
///
/// Lets the message checksum be computed without first concatenating
/// the prelude, headers, and payload into one buffer.
pub struct MessageHasher {
    hasher: crc32fast::Hasher,
}

impl MessageHasher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            hasher: crc32fast::Hasher::new(),
        }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    #[must_use]
    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }
}

impl Default for MessageHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// CRC32 over `prelude ∥ prelude_crc ∥ headers ∥ payload`.
#[must_use]
pub fn message_checksum(raw: &RawMessage) -> u32 {
    let mut hasher = MessageHasher::new();
    hasher.update(&raw.prelude.to_bytes());
    hasher.update(&raw.prelude_crc.to_be_bytes());
    hasher.update(&raw.headers);
    hasher.update(&raw.payload);
    hasher.finalize()
}

/// Verify only the trailing message checksum.
///
/// # Errors
///
/// [`WireError::ChecksumMismatch`] with [`ChecksumKind::Message`].
pub fn verify_message(raw: &RawMessage) -> Result<(), WireError> {
    let computed = message_checksum(raw);
    if computed == raw.message_crc {
        Ok(())
    } else {
        Err(WireError::ChecksumMismatch {
            kind: ChecksumKind::Message,
            expected: raw.message_crc,
            computed,
        })
    }
}

/// Verify both checksums of a fully assembled message, prelude first.
///
/// # Errors
///
/// [`WireError::ChecksumMismatch`] naming whichever checksum failed.
pub fn validate(raw: &RawMessage) -> Result<(), WireError> {
    let computed = prelude_checksum(&raw.prelude.to_bytes());
    if computed != raw.prelude_crc {
        return Err(WireError::ChecksumMismatch {
            kind: ChecksumKind::Prelude,
            expected: raw.prelude_crc,
            computed,
        });
    }
    verify_message(raw)
}
