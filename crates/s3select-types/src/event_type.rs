use std::fmt;

/// Value of the `:message-type` header.
///
/// ```text
/// ┌─────────┬────────────────────────────────────────────┐
/// │ Wire    │ Meaning                                    │
/// ├─────────┼────────────────────────────────────────────┤
/// │ event   │ Regular event, see `:event-type`           │
/// │ error   │ Server error, see `:error-code`/`-message` │
/// └─────────┴────────────────────────────────────────────┘
/// ```
///
/// Parsing is case-insensitive. Anything else is kept as `Unknown` with
/// the original spelling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageType {
  Event,
  Error,
  Unknown(String),
}

impl MessageType {
  #[must_use]
  pub fn parse(raw: &str) -> Self {
    if raw.eq_ignore_ascii_case("event") {
      Self::Event
    } else if raw.eq_ignore_ascii_case("error") {
      Self::Error
    } else {
      Self::Unknown(raw.to_owned())
    }
  }

  /// The spelling written on the wire.
  #[must_use]
  pub fn as_str(&self) -> &str {
    match self {
      Self::Event => "event",
      Self::Error => "error",
      Self::Unknown(raw) => raw,
    }
  }
}

impl fmt::Display for MessageType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Value of the `:event-type` header.
///
/// ```text
/// ┌──────────┬──────────────────────────────────────────────────┐
/// │ Wire     │ Payload                                          │
/// ├──────────┼──────────────────────────────────────────────────┤
/// │ Records  │ A chunk of query result bytes                    │
/// │ Cont     │ None; keep-alive while the server scans          │
/// │ Progress │ XML <Progress> document                          │
/// │ Stats    │ XML <Stats> document, sent once before End       │
/// │ End      │ None; the stream completed successfully          │
/// └──────────┴──────────────────────────────────────────────────┘
/// ```
///
/// Unrecognized event types are preserved as `Unknown` so callers can
/// ignore them without losing the spelling for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventType {
  Records,
  Cont,
  Progress,
  Stats,
  End,
  Unknown(String),
}

impl EventType {
  #[must_use]
  pub fn parse(raw: &str) -> Self {
    const KNOWN: [(&str, EventType); 5] = [
      ("Records", EventType::Records),
      ("Cont", EventType::Cont),
      ("Progress", EventType::Progress),
      ("Stats", EventType::Stats),
      ("End", EventType::End),
    ];
    KNOWN
      .into_iter()
      .find(|(name, _)| raw.eq_ignore_ascii_case(name))
      .map_or_else(|| Self::Unknown(raw.to_owned()), |(_, kind)| kind)
  }

  #[must_use]
  pub fn as_str(&self) -> &str {
    match self {
      Self::Records => "Records",
      Self::Cont => "Cont",
      Self::Progress => "Progress",
      Self::Stats => "Stats",
      Self::End => "End",
      Self::Unknown(raw) => raw,
    }
  }
}

impl fmt::Display for EventType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
