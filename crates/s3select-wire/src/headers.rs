use std::collections::HashSet;

use crate::endian::{read_slice, read_u8, read_u16_be};
use crate::error::{Section, WireError};

/// Value-type tag for a UTF-8 string, the only type Select responses use.
pub const VALUE_TYPE_STRING: u8 = 7;

/// Longest header name the 1-byte length prefix can describe.
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

/// Longest header value the 2-byte length prefix can describe.
pub const MAX_VALUE_LEN: usize = u16::MAX as usize;

/// A single string-valued header.
///
/// Wire layout:
///
/// ```text
/// ┌──────────┬───────────────┬────────────┬────────────┬────────────────┐
/// │ name_len │ name          │ value_type │ value_len  │ value          │
/// │ u8       │ name_len B    │ u8 (= 7)   │ u16 BE     │ value_len B    │
/// └──────────┴───────────────┴────────────┴────────────┴────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    fn encoded_len(&self) -> usize {
        1 + self.name.len() + 1 + 2 + self.value.len()
    }
}

/// Ordered header block of one message.
///
/// Insertion order is preserved. Names are unique: a second header with
/// a name already present is rejected with [`WireError::DuplicateHeader`],
/// both when parsing and when building.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(Vec<Header>);

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a header.
    ///
    /// # Errors
    ///
    /// [`WireError::DuplicateHeader`] if `name` is already present.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), WireError> {
        let header = Header::new(name, value);
        if self.get(&header.name).is_some() {
            return Err(WireError::DuplicateHeader { name: header.name });
        }
        self.0.push(header);
        Ok(())
    }

    /// Value of the header called exactly `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Size of the encoded header block in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.0.iter().map(Header::encoded_len).sum()
    }

    /// Append the encoded header block to `out`.
    ///
    /// # Returns
    ///
    /// Number of bytes appended.
    ///
    /// # Errors
    ///
    /// [`WireError::HeaderNameTooLong`] or [`WireError::HeaderValueTooLong`]
    /// if a length does not fit its prefix. Nothing is appended on error.
    pub fn write_to(&self, out: &mut Vec<u8>) -> Result<usize, WireError> {
        let start = out.len();
        out.reserve(self.encoded_len());
        for header in &self.0 {
            if let Err(e) = write_header(header, out) {
                out.truncate(start);
                return Err(e);
            }
        }
        Ok(out.len() - start)
    }

    /// Parse a complete header block.
    ///
    /// Consumes `buf` until the offset reaches its end; `buf` must be
    /// exactly `headers_len` bytes.
    ///
    /// # Errors
    ///
    /// - [`WireError::ShortRead`] if a header is cut off mid-way.
    /// - [`WireError::InvalidUtf8`] if a name or value is not UTF-8.
    /// - [`WireError::UnsupportedHeaderValueType`] if a type byte is not 7.
    /// - [`WireError::DuplicateHeader`] if a name repeats.
    ///
    /// Runs in time linear in the number of headers.
    pub fn parse(buf: &[u8]) -> Result<Self, WireError> {
        let mut headers = Self::new();
        let mut seen = HashSet::new();
        let mut offset = 0;

        while offset < buf.len() {
            let name_len = usize::from(read_u8(buf, offset, Section::Headers)?);
            offset += 1;
            let name = read_str(buf, offset, name_len)?;
            offset += name_len;

            let value_type = read_u8(buf, offset, Section::Headers)?;
            offset += 1;
            if value_type != VALUE_TYPE_STRING {
                return Err(WireError::UnsupportedHeaderValueType { name, value_type });
            }

            let value_len = usize::from(read_u16_be(buf, offset, Section::Headers)?);
            offset += 2;
            let value = read_str(buf, offset, value_len)?;
            offset += value_len;

            if !seen.insert(name.clone()) {
                return Err(WireError::DuplicateHeader { name });
            }
            headers.0.push(Header { name, value });
        }

        Ok(headers)
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parse a header block. Shorthand for [`Headers::parse`].
///
/// # Errors
///
/// See [`Headers::parse`].
pub fn parse_headers(buf: &[u8]) -> Result<Headers, WireError> {
    Headers::parse(buf)
}

fn read_str(buf: &[u8], offset: usize, len: usize) -> Result<String, WireError> {
    let bytes = read_slice(buf, offset, len, Section::Headers)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| WireError::InvalidUtf8 { offset })
}

fn write_header(header: &Header, out: &mut Vec<u8>) -> Result<(), WireError> {
    let name_len = u8::try_from(header.name.len()).map_err(|_| WireError::HeaderNameTooLong {
        len: header.name.len(),
    })?;
    let value_len =
        u16::try_from(header.value.len()).map_err(|_| WireError::HeaderValueTooLong {
            name: header.name.clone(),
            len: header.value.len(),
        })?;

    out.push(name_len);
    out.extend_from_slice(header.name.as_bytes());
    out.push(VALUE_TYPE_STRING);
    out.extend_from_slice(&value_len.to_be_bytes());
    out.extend_from_slice(header.value.as_bytes());
    Ok(())
}
