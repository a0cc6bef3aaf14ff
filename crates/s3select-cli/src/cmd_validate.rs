/// Implementation of `s3select validate`.
///
/// Reports a series of success checkmarks (`✓`) or a diagnostic failure
/// line (`✗`). Exits 0 on a valid stream and 1 on any problem.
///
/// # Success output
///
/// ```text
/// ✓ Framing: 5 messages, 612 bytes
/// ✓ Checksums: prelude and message CRC32 valid for every message
/// ✓ Headers: all string-typed, no duplicates
/// ✓ End: present (message 4)
/// ```
///
/// Messages after End are still checked but reported with a warning,
/// since a decoder never reads them. A server error message is not a
/// structural problem and is listed, not failed.
use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result, anyhow};
use s3select_decoder::{DecodeError, ErrorKind};
use s3select_types::protocol::header;
use s3select_types::{EventType, MessageType};
use s3select_wire::FrameReader;

use crate::ValidateArgs;

/// Run the `s3select validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or any message fails
/// framing, checksum, or header parsing, or if no End event is present.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let file =
        File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;
    let mut frames = FrameReader::new(BufReader::new(file));

    let mut count = 0usize;
    let mut end_at = None;
    let mut errors = Vec::new();

    loop {
        let offset = frames.bytes_read();
        let raw = match frames.read_message() {
            Ok(Some(raw)) => raw,
            Ok(None) => break,
            Err(e) => return fail(count, offset, e.into()),
        };
        let headers = match raw.parse_headers() {
            Ok(headers) => headers,
            Err(e) => return fail(count, offset, e.into()),
        };

        match headers.get(header::MESSAGE_TYPE).map(MessageType::parse) {
            Some(MessageType::Error) => errors.push((
                count,
                headers.get(header::ERROR_CODE).unwrap_or_default().to_owned(),
            )),
            _ => {
                let is_end = headers
                    .get(header::EVENT_TYPE)
                    .is_some_and(|t| EventType::parse(t) == EventType::End);
                if is_end && end_at.is_none() {
                    end_at = Some(count);
                }
            }
        }
        count += 1;
    }

    println!(
        "✓ Framing: {count} message{}, {} bytes",
        if count == 1 { "" } else { "s" },
        frames.bytes_read()
    );
    println!("✓ Checksums: prelude and message CRC32 valid for every message");
    println!("✓ Headers: all string-typed, no duplicates");
    for (index, code) in &errors {
        println!("! Server error: message {index} carries error code {code:?}");
    }

    match end_at {
        Some(index) => {
            println!("✓ End: present (message {index})");
            if index + 1 < count {
                println!(
                    "! Trailing: {} message(s) after End are never decoded",
                    count - index - 1
                );
            }
            Ok(())
        }
        None if !errors.is_empty() => {
            println!("✓ End: absent, stream terminated by a server error");
            Ok(())
        }
        None => {
            println!("✗ Error: {}", DecodeError::MissingEndEvent);
            Err(anyhow!("validation failed"))
        }
    }
}

fn fail(index: usize, offset: u64, e: DecodeError) -> Result<()> {
    println!("✗ Error: {} at message {index} (offset {offset}): {e}", label(e.kind()));
    Err(anyhow!("validation failed"))
}

/// Diagnostic prefix per failure category.
///
/// ```text
/// ┌─────────────────────────────┬─────────────────────────────┐
/// │ ErrorKind                   │ Prefix                      │
/// ├─────────────────────────────┼─────────────────────────────┤
/// │ Framing                     │ "framing error"             │
/// │ ChecksumMismatch            │ "checksum mismatch"         │
/// │ UnsupportedHeaderValueType  │ "unsupported header"        │
/// │ Io                          │ "read error"                │
/// └─────────────────────────────┴─────────────────────────────┘
/// ```
fn label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::ChecksumMismatch => "checksum mismatch",
        ErrorKind::UnsupportedHeaderValueType => "unsupported header",
        ErrorKind::Io => "read error",
        _ => "framing error",
    }
}
