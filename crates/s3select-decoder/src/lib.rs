#![warn(clippy::pedantic)]

pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod output;
pub mod state;
pub mod streaming;

pub use config::DecoderConfig;
pub use decoder::SelectDecoder;
pub use dispatch::{Dispatch, EventPayloadParser, IgnoreReason, XmlPayloadParser, dispatch};
pub use error::{DecodeError, ErrorKind};
pub use event::SelectEvent;
pub use output::{SelectOutput, Terminal};
pub use state::{DecoderState, Transition};
pub use streaming::StreamingDecoder;
