/// Implementation of `s3select encode`.
///
/// Builds an event stream from a JSON manifest. Useful for producing
/// fixtures and for replaying a response shape against a client.
///
/// # Manifest format
///
/// ```json
/// {
///   "messages": [
///     { "type": "records",  "content": "a,b,c\n" },
///     { "type": "records",  "content_file": "chunk.csv" },
///     { "type": "cont" },
///     { "type": "progress", "bytes_scanned": 100, "bytes_processed": 200, "bytes_returned": 6 },
///     { "type": "stats",    "bytes_scanned": 100, "bytes_processed": 200, "bytes_returned": 6 },
///     { "type": "event",    "event_type": "Telemetry", "content": "..." },
///     { "type": "error",    "code": "InvalidRequest", "message": "bad query" },
///     { "type": "end" }
///   ]
/// }
/// ```
///
/// `content_file` paths are resolved relative to the manifest's
/// directory. Counters default to 0. Messages are written in manifest
/// order; nothing stops a manifest from producing a stream a decoder
/// rejects, which is the point for fixtures.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use s3select_encoder::EventStreamEncoder;
use s3select_types::{EventType, ProgressEvent, StatsEvent};

use crate::EncodeArgs;

// ── Manifest serde types ──────────────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct Manifest {
    messages: Vec<ManifestMessage>,
}

/// A single message entry. The `type` field selects the variant.
#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ManifestMessage {
    Records {
        content: Option<String>,
        content_file: Option<String>,
    },
    Cont,
    Progress {
        #[serde(flatten)]
        counters: Counters,
    },
    Stats {
        #[serde(flatten)]
        counters: Counters,
    },
    End,
    Error {
        code: String,
        message: String,
    },
    /// Any event type; known names are written in their canonical spelling.
    Event {
        event_type: String,
        content: Option<String>,
        content_file: Option<String>,
    },
}

#[derive(serde::Deserialize, Default)]
#[serde(default)]
struct Counters {
    bytes_scanned: u64,
    bytes_processed: u64,
    bytes_returned: u64,
}

/// Run the `s3select encode` command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or parsed, a
/// `content_file` is missing, the manifest has no messages, or the output
/// cannot be written.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let manifest: Manifest = serde_json::from_str(&text)
        .with_context(|| format!("invalid manifest {}", args.input.display()))?;
    let base = args.input.parent().unwrap_or_else(|| Path::new("."));

    let mut encoder = EventStreamEncoder::new();
    for (index, message) in manifest.messages.into_iter().enumerate() {
        add_message(&mut encoder, message, base)
            .with_context(|| format!("manifest message {index}"))?;
    }

    let bytes = encoder.encode().context("failed to encode event stream")?;
    fs::write(&args.output, &bytes)
        .with_context(|| format!("cannot write {}", args.output.display()))?;
    eprintln!(
        "wrote {} message{} ({} bytes) to {}",
        encoder.len(),
        if encoder.len() == 1 { "" } else { "s" },
        bytes.len(),
        args.output.display()
    );
    Ok(())
}

fn add_message(encoder: &mut EventStreamEncoder, message: ManifestMessage, base: &Path) -> Result<()> {
    match message {
        ManifestMessage::Records {
            content,
            content_file,
        } => {
            encoder.add_records(&resolve_content(content, content_file, base)?);
        }
        ManifestMessage::Cont => {
            encoder.add_cont();
        }
        ManifestMessage::Progress { counters } => {
            encoder.add_progress(ProgressEvent {
                bytes_scanned: counters.bytes_scanned,
                bytes_processed: counters.bytes_processed,
                bytes_returned: counters.bytes_returned,
            });
        }
        ManifestMessage::Stats { counters } => {
            encoder.add_stats(StatsEvent {
                bytes_scanned: counters.bytes_scanned,
                bytes_processed: counters.bytes_processed,
                bytes_returned: counters.bytes_returned,
            });
        }
        ManifestMessage::End => {
            encoder.add_end();
        }
        ManifestMessage::Error { code, message } => {
            encoder.add_error(&code, &message);
        }
        ManifestMessage::Event {
            event_type,
            content,
            content_file,
        } => {
            let payload = resolve_content(content, content_file, base)?;
            encoder.add_event(EventType::parse(&event_type), &payload);
        }
    }
    Ok(())
}

/// Inline `content` or the bytes of `content_file`; exactly one must be set.
fn resolve_content(
    content: Option<String>,
    content_file: Option<String>,
    base: &Path,
) -> Result<Vec<u8>> {
    match (content, content_file) {
        (Some(text), None) => Ok(text.into_bytes()),
        (None, Some(file)) => {
            let path = base.join(file);
            fs::read(&path).with_context(|| format!("cannot read {}", path.display()))
        }
        (Some(_), Some(_)) => bail!("`content` and `content_file` are mutually exclusive"),
        (None, None) => bail!("one of `content` or `content_file` is required"),
    }
}
