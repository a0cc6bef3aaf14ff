use s3select_types::{ProgressEvent, StatsEvent};

/// One decoded event from a Select response, in stream order.
///
/// Keep-alive (`Cont`), empty, and unrecognized events never appear
/// here; the decoder skips them. Server errors are returned as
/// [`DecodeError::Server`](crate::DecodeError::Server) instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectEvent {
    /// A chunk of query results, verbatim.
    Records(Vec<u8>),
    Progress(ProgressEvent),
    Stats(StatsEvent),
    /// The stream completed. Always the last event.
    End,
}
