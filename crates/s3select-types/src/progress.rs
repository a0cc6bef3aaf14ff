use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::xml;

/// Body of a Progress event: how far the server has got with the query.
///
/// Servers send Progress events periodically when progress reporting was
/// requested. Each one supersedes the last; the counters are running
/// totals, not deltas.
///
/// ```xml
/// <Progress>
///   <BytesScanned>512</BytesScanned>
///   <BytesProcessed>1024</BytesProcessed>
///   <BytesReturned>64</BytesReturned>
/// </Progress>
/// ```
///
/// Missing elements read as 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Progress", rename_all = "PascalCase", default)]
pub struct ProgressEvent {
  /// Bytes of the object read from storage (compressed size).
  pub bytes_scanned: u64,
  /// Bytes fed to the query engine (uncompressed size).
  pub bytes_processed: u64,
  /// Bytes of result records sent so far.
  pub bytes_returned: u64,
}

impl ProgressEvent {
  /// Map a Progress payload.
  ///
  /// # Errors
  ///
  /// [`TypeError::InvalidUtf8`] or [`TypeError::Xml`].
  pub fn from_xml(payload: &[u8]) -> Result<Self, TypeError> {
    xml::from_xml(payload)
  }

  /// Render as a `<Progress>` document.
  ///
  /// # Errors
  ///
  /// [`TypeError::Xml`] if serialization fails.
  pub fn to_xml(&self) -> Result<String, TypeError> {
    xml::to_xml(self)
  }
}
