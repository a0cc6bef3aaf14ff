#![warn(clippy::pedantic)]

pub mod error;
pub mod event_type;
pub mod progress;
pub mod protocol;
pub mod stats;

mod xml;

pub use error::TypeError;
pub use event_type::{EventType, MessageType};
pub use progress::ProgressEvent;
pub use stats::StatsEvent;
