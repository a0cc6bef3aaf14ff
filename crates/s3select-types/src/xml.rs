use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::TypeError;

/// Map an XML payload onto `T`.
///
/// A leading byte-order mark is tolerated. Elements `T` does not name
/// are ignored, so newer servers may add fields freely.
pub(crate) fn from_xml<T: DeserializeOwned>(payload: &[u8]) -> Result<T, TypeError> {
  let text = std::str::from_utf8(payload).map_err(|e| TypeError::InvalidUtf8 {
    valid_up_to: e.valid_up_to(),
  })?;
  quick_xml::de::from_str(text.trim_start_matches('\u{feff}'))
    .map_err(|e| TypeError::Xml(e.to_string()))
}

/// Serialize `T` as an XML document whose root is `T`'s serde name.
pub(crate) fn to_xml<T: Serialize>(value: &T) -> Result<String, TypeError> {
  quick_xml::se::to_string(value).map_err(|e| TypeError::Xml(e.to_string()))
}
