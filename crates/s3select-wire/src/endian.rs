//! Bounds-checked big-endian reads over a byte slice.
//!
//! Every integer in the event-stream format is big-endian. These helpers
//! never panic: a read past the end of `buf` becomes
//! [`WireError::ShortRead`] tagged with the section being parsed.

use crate::error::{Section, WireError};

/// Borrow `len` bytes starting at `offset`.
///
/// # Errors
///
/// [`WireError::ShortRead`] if `offset + len` runs past the end of `buf`.
pub fn read_slice(buf: &[u8], offset: usize, len: usize, section: Section) -> Result<&[u8], WireError> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(WireError::ShortRead {
            section,
            needed: len,
        })
}

/// # Errors
///
/// [`WireError::ShortRead`] if `offset` is out of bounds.
pub fn read_u8(buf: &[u8], offset: usize, section: Section) -> Result<u8, WireError> {
    buf.get(offset).copied().ok_or(WireError::ShortRead {
        section,
        needed: 1,
    })
}

/// # Errors
///
/// [`WireError::ShortRead`] if fewer than 2 bytes remain at `offset`.
pub fn read_u16_be(buf: &[u8], offset: usize, section: Section) -> Result<u16, WireError> {
    let b = read_slice(buf, offset, 2, section)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

/// # Errors
///
/// [`WireError::ShortRead`] if fewer than 4 bytes remain at `offset`.
pub fn read_u32_be(buf: &[u8], offset: usize, section: Section) -> Result<u32, WireError> {
    let b = read_slice(buf, offset, 4, section)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_big_endian() {
        let buf = [0x00, 0x00, 0x01, 0x02, 0xAB];
        assert_eq!(read_u32_be(&buf, 0, Section::Prelude).unwrap(), 0x0102);
        assert_eq!(read_u16_be(&buf, 2, Section::Headers).unwrap(), 0x0102);
        assert_eq!(read_u8(&buf, 4, Section::Headers).unwrap(), 0xAB);
    }

    #[test]
    fn read_past_end_reports_section() {
        let buf = [0x01, 0x02, 0x03];
        let err = read_u32_be(&buf, 0, Section::MessageChecksum).unwrap_err();
        assert!(matches!(
            err,
            WireError::ShortRead {
                section: Section::MessageChecksum,
                needed: 4
            }
        ));
    }

    #[test]
    fn read_slice_rejects_offset_overflow() {
        let buf = [0u8; 4];
        let err = read_slice(&buf, usize::MAX, 2, Section::Payload).unwrap_err();
        assert!(matches!(err, WireError::ShortRead { needed: 2, .. }));
    }

    #[test]
    fn read_u8_at_end_is_short() {
        assert!(read_u8(&[], 0, Section::Headers).is_err());
    }
}
