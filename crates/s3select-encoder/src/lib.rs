#![warn(clippy::pedantic)]

pub mod encoder;
pub mod error;

pub use encoder::EventStreamEncoder;
pub use error::EncodeError;
