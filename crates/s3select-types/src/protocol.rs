//! Header names and values that Select Object Content responses use.

/// Header names.
///
/// Names are matched exactly; only the values of `:message-type` and
/// `:event-type` are compared case-insensitively.
pub mod header {
  pub const MESSAGE_TYPE: &str = ":message-type";
  pub const EVENT_TYPE: &str = ":event-type";
  pub const CONTENT_TYPE: &str = ":content-type";
  pub const ERROR_CODE: &str = ":error-code";
  pub const ERROR_MESSAGE: &str = ":error-message";
}

/// `:content-type` values.
pub mod content_type {
  /// Records payloads: raw query result bytes.
  pub const OCTET_STREAM: &str = "application/octet-stream";
  /// Progress and Stats payloads.
  pub const XML: &str = "text/xml";
}
