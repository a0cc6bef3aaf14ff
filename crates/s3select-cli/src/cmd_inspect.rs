/// Implementation of `s3select inspect`.
///
/// Walks every message in the file without interpreting events, so it
/// also shows messages after End and unknown event types.
///
/// # Output format
///
/// ```text
/// Message 0 @0: total=101 headers=85 payload=0 event/Records prelude_crc=0x1A2B3C4D message_crc=0x...
/// Message 1 @101: total=... error code="InvalidRequest"
/// ---
/// 2 messages, 190 bytes
/// ```
use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use s3select_types::protocol::header;
use s3select_wire::{FrameReader, Headers, RawMessage};

use crate::InspectArgs;

/// Payload bytes shown by `--show-payload`.
const PAYLOAD_PREVIEW: usize = 64;

/// Run the `s3select inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, or at the first message
/// that fails framing, checksum, or header parsing.
pub fn run(args: &InspectArgs) -> Result<()> {
    let file =
        File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;
    let mut frames = FrameReader::new(BufReader::new(file));

    let mut index = 0usize;
    loop {
        let offset = frames.bytes_read();
        let Some(raw) = frames
            .read_message()
            .with_context(|| format!("message {index} at offset {offset}"))?
        else {
            break;
        };
        let headers = raw
            .parse_headers()
            .with_context(|| format!("headers of message {index} at offset {offset}"))?;

        println!(
            "Message {index} @{offset}: total={} headers={} payload={} {} prelude_crc={:#010X} message_crc={:#010X}",
            raw.prelude.total_len,
            raw.prelude.headers_len,
            raw.payload.len(),
            kind_label(&headers),
            raw.prelude_crc,
            raw.message_crc,
        );

        if args.show_headers {
            for h in &headers {
                println!("         {} = {:?}", h.name, h.value);
            }
        }
        if args.show_payload && !raw.payload.is_empty() {
            print_payload(&raw);
        }
        index += 1;
    }

    println!("---");
    println!(
        "{index} message{}, {} bytes",
        if index == 1 { "" } else { "s" },
        frames.bytes_read()
    );
    Ok(())
}

/// `event/<type>` for events, `error code=...` for server errors.
fn kind_label(headers: &Headers) -> String {
    let message_type = headers.get(header::MESSAGE_TYPE).unwrap_or("-");
    if message_type.eq_ignore_ascii_case("error") {
        let code = headers.get(header::ERROR_CODE).unwrap_or_default();
        return format!("error code={code:?}");
    }
    let event_type = headers.get(header::EVENT_TYPE).unwrap_or("-");
    format!("{message_type}/{event_type}")
}

fn print_payload(raw: &RawMessage) {
    let shown = &raw.payload[..raw.payload.len().min(PAYLOAD_PREVIEW)];
    for (i, chunk) in shown.chunks(16).enumerate() {
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
            .collect();
        println!("           {:04x}  {:<32}  {ascii}", i * 16, hex::encode(chunk));
    }
    if raw.payload.len() > PAYLOAD_PREVIEW {
        println!("           … {} more bytes", raw.payload.len() - PAYLOAD_PREVIEW);
    }
}
