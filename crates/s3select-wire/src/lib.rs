#![warn(clippy::pedantic)]

pub mod checksum;
pub mod endian;
pub mod error;
pub mod frame;
pub mod headers;
pub mod prelude;

pub use error::{ChecksumKind, Section, WireError};
pub use frame::{FrameReader, RawMessage, encode_message};
pub use headers::{Header, Headers, parse_headers};
pub use prelude::{FrameLimits, Prelude};
