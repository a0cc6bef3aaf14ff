/// Errors raised while mapping an event payload to a typed record.
///
/// Progress and Stats events carry a small XML document. These errors
/// cover the two ways that document can be unusable; framing problems
/// never reach this layer because the checksums have already passed.
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                              │
/// │   ├── InvalidUtf8 for payload bytes that aren't text│
/// │   └── Xml for documents quick-xml cannot map        │
/// └─────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
  /// The payload is not UTF-8, so it cannot be an XML document.
  #[error("event payload is not valid UTF-8 (valid up to byte {valid_up_to})")]
  InvalidUtf8 { valid_up_to: usize },

  /// quick-xml rejected the document, or a field failed to parse as a
  /// number. The message is quick-xml's own.
  #[error("malformed XML event payload: {0}")]
  Xml(String),
}
