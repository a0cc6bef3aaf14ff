use s3select_wire::checksum;
use s3select_wire::prelude::{CRC_LEN, PRELUDE_BLOCK_LEN, Prelude, partial_prelude_error};
use s3select_wire::{RawMessage, Section, WireError};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::config::DecoderConfig;
use crate::dispatch::{EventPayloadParser, XmlPayloadParser, decode_message};
use crate::error::DecodeError;
use crate::event::SelectEvent;
use crate::output::SelectOutput;
use crate::state::{self, DecoderState};

/// Asynchronous Select response decoder, for bodies that arrive
/// incrementally (HTTP response streams, sockets, files).
///
/// Same semantics as the synchronous
/// [`SelectDecoder`](crate::SelectDecoder): the same dispatch rules,
/// limits, and state machine, and nothing is read after End or an error.
/// Backpressure is natural: the next message is only read when the
/// caller awaits the next item.
///
/// With a cancellation token configured, a read that is stalled waiting
/// on the source is abandoned as soon as the token fires.
///
/// # Example
///
/// ```rust,no_run
/// use s3select_decoder::StreamingDecoder;
/// use tokio::io::AsyncRead;
///
/// async fn print_records(body: impl AsyncRead + Unpin) {
///   let mut stream = StreamingDecoder::new(body);
///   while let Some(event) = stream.next().await {
///     println!("{:?}", event);
///   }
/// }
/// ```
pub struct StreamingDecoder<R, P = XmlPayloadParser> {
  reader: R,
  parser: P,
  config: DecoderConfig,
  state: DecoderState,
  bytes_read: u64,
  messages_read: u64,
}

impl<R: AsyncRead + Unpin> StreamingDecoder<R> {
  #[must_use]
  pub fn new(reader: R) -> Self {
    Self::with_config(reader, DecoderConfig::default())
  }

  #[must_use]
  pub fn with_config(reader: R, config: DecoderConfig) -> Self {
    Self::with_parser(reader, config, XmlPayloadParser)
  }
}

impl<R: AsyncRead + Unpin, P: EventPayloadParser> StreamingDecoder<R, P> {
  #[must_use]
  pub fn with_parser(reader: R, config: DecoderConfig, parser: P) -> Self {
    Self {
      reader,
      parser,
      config,
      state: DecoderState::Reading,
      bytes_read: 0,
      messages_read: 0,
    }
  }

  #[must_use]
  pub fn state(&self) -> DecoderState {
    self.state
  }

  #[must_use]
  pub fn messages_read(&self) -> u64 {
    self.messages_read
  }

  #[must_use]
  pub fn bytes_read(&self) -> u64 {
    self.bytes_read
  }

  /// Read the next event from the stream.
  ///
  /// Returns `Some(Ok(event))` for each decoded event, `Some(Err(_))`
  /// once for the error that ends the decode, and `None` after End or
  /// an error.
  pub async fn next(&mut self) -> Option<Result<SelectEvent, DecodeError>> {
    while self.state == DecoderState::Reading {
      let read = match self.config.cancellation.clone() {
        Some(token) if token.is_cancelled() => Err(DecodeError::Cancelled),
        Some(token) => tokio::select! {
          biased;
          () = token.cancelled() => Err(DecodeError::Cancelled),
          read = self.read_message() => read.map_err(DecodeError::from),
        },
        None => self.read_message().await.map_err(DecodeError::from),
      };

      let raw = match read {
        Ok(Some(raw)) => raw,
        Ok(None) => {
          return Some(Err(state::fail(
            &mut self.state,
            DecodeError::MissingEndEvent,
          )));
        }
        Err(e) => return Some(Err(state::fail(&mut self.state, e))),
      };
      self.messages_read += 1;

      let outcome = decode_message(raw, &self.parser);
      if let Some(item) = state::settle(&mut self.state, outcome) {
        return Some(item);
      }
    }
    None
  }

  /// Drain the stream into a [`SelectOutput`].
  pub async fn collect_output(mut self) -> SelectOutput {
    let mut output = SelectOutput::new();
    while let Some(item) = self.next().await {
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

  /// Read one checksum-verified message, or `None` on a clean boundary.
  async fn read_message(&mut self) -> Result<Option<RawMessage>, WireError> {
    let mut head = [0u8; PRELUDE_BLOCK_LEN];
    let filled = self.fill(&mut head).await?;
    if filled == 0 {
      return Ok(None);
    }
    if filled < PRELUDE_BLOCK_LEN {
      return Err(partial_prelude_error(filled));
    }

    let (prelude, prelude_crc) = Prelude::read_from(&head, &self.config.limits)?;
    let headers = self
      .read_section(prelude.headers_len as usize, Section::Headers)
      .await?;
    let payload = self
      .read_section(prelude.payload_len() as usize, Section::Payload)
      .await?;
    let mut crc = [0u8; CRC_LEN];
    self
      .read_exact_section(&mut crc, Section::MessageChecksum)
      .await?;

    let raw = RawMessage {
      prelude,
      prelude_crc,
      headers,
      payload,
      message_crc: u32::from_be_bytes(crc),
    };
    checksum::verify_message(&raw)?;

    trace!(
      total_len = prelude.total_len,
      headers_len = prelude.headers_len,
      "read event-stream message"
    );
    Ok(Some(raw))
  }

  async fn read_section(&mut self, len: usize, section: Section) -> Result<Vec<u8>, WireError> {
    let mut buf = vec![0u8; len];
    self.read_exact_section(&mut buf, section).await?;
    Ok(buf)
  }

  async fn read_exact_section(
    &mut self,
    buf: &mut [u8],
    section: Section,
  ) -> Result<(), WireError> {
    if self.fill(buf).await? < buf.len() {
      return Err(WireError::ShortRead {
        section,
        needed: buf.len(),
      });
    }
    Ok(())
  }

  /// Read until `buf` is full or the source reports end of stream.
  async fn fill(&mut self, buf: &mut [u8]) -> Result<usize, WireError> {
    let mut filled = 0;
    while filled < buf.len() {
      let n = self.reader.read(&mut buf[filled..]).await?;
      if n == 0 {
        break;
      }
      filled += n;
    }
    self.bytes_read += filled as u64;
    Ok(filled)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::SelectDecoder;
  use crate::output::Terminal;
  use s3select_encoder::EventStreamEncoder;
  use s3select_types::ProgressEvent;
  use tokio::io::AsyncWriteExt;
  use tokio_util::sync::CancellationToken;

  /// Helper: decode `body` via the streaming decoder, collecting all
  /// items into a Vec.
  async fn stream_all(body: Vec<u8>) -> Vec<Result<SelectEvent, DecodeError>> {
    let reader = tokio::io::BufReader::new(std::io::Cursor::new(body));
    let mut decoder = StreamingDecoder::new(reader);
    let mut items = Vec::new();
    while let Some(item) = decoder.next().await {
      items.push(item);
    }
    items
  }

  fn sample_body() -> Vec<u8> {
    EventStreamEncoder::new()
      .add_records(b"hello, ")
      .add_cont()
      .add_progress(ProgressEvent {
        bytes_scanned: 100,
        ..ProgressEvent::default()
      })
      .add_records(b"world")
      .add_end()
      .encode()
      .unwrap()
  }

  #[tokio::test]
  async fn streaming_matches_sync_decoder() {
    let body = sample_body();
    let sync_events: Vec<_> = SelectDecoder::new(body.as_slice())
      .map(Result::unwrap)
      .collect();
    let stream_events: Vec<_> = stream_all(body)
      .await
      .into_iter()
      .map(Result::unwrap)
      .collect();
    assert_eq!(sync_events, stream_events);
    assert_eq!(stream_events.len(), 4);
  }

  #[tokio::test]
  async fn collect_output_folds() {
    let reader = std::io::Cursor::new(sample_body());
    let output = StreamingDecoder::new(reader).collect_output().await;
    assert_eq!(output.payload, b"hello, world");
    assert_eq!(output.progress.unwrap().bytes_scanned, 100);
    assert!(output.is_ended());
  }

  #[tokio::test]
  async fn stops_reading_after_end() {
    let mut body = sample_body();
    let valid_len = body.len() as u64;
    body.extend_from_slice(&[0xAB; 64]);

    let mut decoder = StreamingDecoder::new(std::io::Cursor::new(body));
    while decoder.next().await.is_some() {}
    assert_eq!(decoder.state(), DecoderState::Ended);
    assert_eq!(decoder.bytes_read(), valid_len);
    assert!(decoder.next().await.is_none());
  }

  #[tokio::test]
  async fn server_error_surfaces() {
    let body = EventStreamEncoder::new()
      .add_error("InvalidRequest", "bad query")
      .add_records(b"never")
      .encode()
      .unwrap();
    let items = stream_all(body).await;
    assert_eq!(items.len(), 1);
    let err = items[0].as_ref().unwrap_err();
    assert_eq!(err.server_error(), Some(("InvalidRequest", "bad query")));
  }

  #[tokio::test]
  async fn truncated_stream_is_short_read() {
    let mut body = sample_body();
    body.truncate(body.len() - 2);
    let items = stream_all(body).await;
    assert!(matches!(
      items.last(),
      Some(Err(DecodeError::Wire(WireError::ShortRead {
        section: Section::MessageChecksum,
        ..
      })))
    ));
  }

  #[tokio::test]
  async fn incremental_delivery() {
    let body = sample_body();
    let (mut tx, rx) = tokio::io::duplex(7);
    let writer = tokio::spawn(async move {
      for chunk in body.chunks(5) {
        tx.write_all(chunk).await.unwrap();
      }
    });

    let output = StreamingDecoder::new(rx).collect_output().await;
    writer.await.unwrap();
    assert_eq!(output.payload, b"hello, world");
    assert!(matches!(output.terminal, Terminal::Ended));
  }

  #[tokio::test]
  async fn cancellation_interrupts_stalled_read() {
    let first = EventStreamEncoder::new()
      .add_records(b"first")
      .encode()
      .unwrap();
    let (mut tx, rx) = tokio::io::duplex(1024);
    tx.write_all(&first).await.unwrap();

    let token = CancellationToken::new();
    let config = DecoderConfig::default().with_cancellation(token.clone());
    let mut decoder = StreamingDecoder::with_config(rx, config);
    assert_eq!(
      decoder.next().await.unwrap().unwrap(),
      SelectEvent::Records(b"first".to_vec())
    );

    // The writer stays open, so the next read would wait forever.
    tokio::spawn(async move {
      tokio::time::sleep(std::time::Duration::from_millis(10)).await;
      token.cancel();
    });
    assert!(matches!(
      decoder.next().await,
      Some(Err(DecodeError::Cancelled))
    ));
    assert_eq!(decoder.state(), DecoderState::Failed);
    drop(tx);
  }
}
