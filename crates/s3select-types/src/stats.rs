use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::xml;

/// Body of a Stats event: final totals for the query.
///
/// Same counters as [`ProgressEvent`](crate::ProgressEvent), sent once
/// near the end of the stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Stats", rename_all = "PascalCase", default)]
pub struct StatsEvent {
  pub bytes_scanned: u64,
  pub bytes_processed: u64,
  pub bytes_returned: u64,
}

impl StatsEvent {
  /// Map a Stats payload.
  ///
  /// # Errors
  ///
  /// [`TypeError::InvalidUtf8`] or [`TypeError::Xml`].
  pub fn from_xml(payload: &[u8]) -> Result<Self, TypeError> {
    xml::from_xml(payload)
  }

  /// Render as a `<Stats>` document.
  ///
  /// # Errors
  ///
  /// [`TypeError::Xml`] if serialization fails.
  pub fn to_xml(&self) -> Result<String, TypeError> {
    xml::to_xml(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_server_document() {
    let xml = b"<Stats><BytesScanned>4096</BytesScanned><BytesProcessed>8192</BytesProcessed><BytesReturned>12</BytesReturned></Stats>";
    let stats = StatsEvent::from_xml(xml).unwrap();
    assert_eq!(stats.bytes_scanned, 4096);
    assert_eq!(stats.bytes_processed, 8192);
    assert_eq!(stats.bytes_returned, 12);
  }

  #[test]
  fn serializes_with_stats_root() {
    let xml = StatsEvent {
      bytes_scanned: 9,
      ..StatsEvent::default()
    }
    .to_xml()
    .unwrap();
    assert_eq!(
      xml,
      "<Stats><BytesScanned>9</BytesScanned><BytesProcessed>0</BytesProcessed><BytesReturned>0</BytesReturned></Stats>"
    );
  }

  #[test]
  fn reject_truncated_document() {
    assert!(StatsEvent::from_xml(b"<Stats><BytesScanned>1</Bytes").is_err());
  }
}
