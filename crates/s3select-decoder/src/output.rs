use s3select_types::{ProgressEvent, StatsEvent};

use crate::error::DecodeError;
use crate::event::SelectEvent;

/// How a decode finished, or that it has not yet.
#[derive(Debug, Default)]
pub enum Terminal {
    #[default]
    Reading,
    Ended,
    Failed(DecodeError),
}

/// The caller-facing result of a Select response: everything the events
/// amount to once folded.
///
/// ```text
/// ┌───────────────────────────────────────────────────────────┐
/// │ SelectOutput                                              │
/// │   payload:  Vec<u8>               ← Records, appended     │
/// │   progress: Option<ProgressEvent> ← last Progress seen    │
/// │   stats:    Option<StatsEvent>    ← last Stats seen       │
/// │   terminal: Terminal              ← Reading/Ended/Failed  │
/// └───────────────────────────────────────────────────────────┘
/// ```
///
/// A failure does not roll anything back: whatever was folded before
/// the error stays available next to it.
#[derive(Debug, Default)]
pub struct SelectOutput {
    pub payload: Vec<u8>,
    pub progress: Option<ProgressEvent>,
    pub stats: Option<StatsEvent>,
    pub terminal: Terminal,
}

impl SelectOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event. Ignored once the output is terminal.
    pub fn apply(&mut self, event: SelectEvent) {
        if !matches!(self.terminal, Terminal::Reading) {
            return;
        }
        match event {
            SelectEvent::Records(chunk) => self.payload.extend_from_slice(&chunk),
            SelectEvent::Progress(progress) => self.progress = Some(progress),
            SelectEvent::Stats(stats) => self.stats = Some(stats),
            SelectEvent::End => self.terminal = Terminal::Ended,
        }
    }

    /// Record a fatal error. Ignored once the output is terminal.
    pub fn fail(&mut self, error: DecodeError) {
        if matches!(self.terminal, Terminal::Reading) {
            self.terminal = Terminal::Failed(error);
        }
    }

    /// Fold a sequence of decode results, stopping at the first error.
    pub fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = Result<SelectEvent, DecodeError>>,
    {
        let mut output = Self::new();
        for item in events {
            match item {
                Ok(event) => output.apply(event),
                Err(error) => {
                    output.fail(error);
                    break;
                }
            }
        }
        output
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        matches!(self.terminal, Terminal::Ended)
    }

    #[must_use]
    pub fn error(&self) -> Option<&DecodeError> {
        match &self.terminal {
            Terminal::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Convert to a `Result` for callers that want `?`.
    ///
    /// # Errors
    ///
    /// The recorded error for a failed decode, or
    /// [`DecodeError::MissingEndEvent`] if the output never reached End.
    /// Partial output is dropped; use the fields directly to keep it.
    pub fn into_result(mut self) -> Result<Self, DecodeError> {
        match std::mem::take(&mut self.terminal) {
            Terminal::Ended => {
                self.terminal = Terminal::Ended;
                Ok(self)
            }
            Terminal::Failed(error) => Err(error),
            Terminal::Reading => Err(DecodeError::MissingEndEvent),
        }
    }
}
