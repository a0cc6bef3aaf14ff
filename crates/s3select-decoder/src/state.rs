use tracing::{debug, warn};

use crate::dispatch::Dispatch;
use crate::error::DecodeError;
use crate::event::SelectEvent;

/// Lifecycle of one response decode.
///
/// ```text
///              Continue
///             ┌────────┐
///             ▼        │
///   ──► Reading ───────┘
///          │   │
///      End │   │ Fail
///          ▼   ▼
///      Ended   Failed
/// ```
///
/// `Ended` and `Failed` are absorbing: no transition leaves them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecoderState {
    #[default]
    Reading,
    Ended,
    Failed,
}

/// Input to [`DecoderState::transition`], derived from one message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Records, Progress, Stats, or an ignored message.
    Continue,
    /// An End event.
    End,
    /// Any fatal error.
    Fail,
}

impl DecoderState {
    #[must_use]
    pub fn transition(self, input: Transition) -> Self {
        match (self, input) {
            (Self::Reading, Transition::Continue) => Self::Reading,
            (Self::Reading, Transition::End) => Self::Ended,
            (Self::Reading, Transition::Fail) => Self::Failed,
            (terminal, _) => terminal,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self != Self::Reading
    }
}

/// Apply the outcome of one message to `state`.
///
/// Returns the item to hand the caller, or `None` when the message was
/// skipped and the loop should read on.
pub(crate) fn settle(
    state: &mut DecoderState,
    outcome: Result<Dispatch, DecodeError>,
) -> Option<Result<SelectEvent, DecodeError>> {
    match outcome {
        Ok(Dispatch::Event(event)) => {
            let input = if event == SelectEvent::End {
                Transition::End
            } else {
                Transition::Continue
            };
            *state = state.transition(input);
            if *state == DecoderState::Ended {
                debug!("event stream ended");
            }
            Some(Ok(event))
        }
        Ok(Dispatch::Ignore(reason)) => {
            debug!(?reason, "skipping message");
            None
        }
        Err(err) => Some(Err(fail(state, err))),
    }
}

/// Move `state` to `Failed` and hand back the error.
pub(crate) fn fail(state: &mut DecoderState, err: DecodeError) -> DecodeError {
    *state = state.transition(Transition::Fail);
    warn!(kind = %err.kind(), error = %err, "select decode failed");
    err
}
