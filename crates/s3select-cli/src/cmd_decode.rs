/// Implementation of `s3select decode`.
///
/// Streams the Records payload to stdout (or `-o <file>`) as each chunk
/// is decoded, so large results never sit in memory. Progress and Stats
/// are reported on stderr:
///
/// ```text
/// progress: scanned=1024 processed=2048 returned=12
/// stats:    scanned=4096 processed=8192 returned=48
/// ```
///
/// On failure the Records written so far stay written and the command
/// exits 1 with the error, e.g. `error: server error InvalidRequest: bad query`.
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use s3select_decoder::{DecoderConfig, SelectDecoder, SelectEvent};
use s3select_wire::FrameLimits;
use tracing::info;

use crate::DecodeArgs;

/// Run the `s3select decode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the output cannot be
/// written, or the stream fails to decode.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let file =
        File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let config = DecoderConfig::default().with_limits(FrameLimits {
        max_message_len: args.max_message_len,
        ..FrameLimits::default()
    });
    let mut decoder = SelectDecoder::with_config(BufReader::new(file), config);

    let mut written = 0usize;
    let result = (&mut decoder).try_for_each(|item| -> Result<()> {
        match item.with_context(|| format!("failed to decode {}", args.file.display()))? {
            SelectEvent::Records(chunk) => {
                out.write_all(&chunk).context("cannot write records")?;
                written += chunk.len();
            }
            SelectEvent::Progress(p) => eprintln!(
                "progress: scanned={} processed={} returned={}",
                p.bytes_scanned, p.bytes_processed, p.bytes_returned
            ),
            SelectEvent::Stats(s) => eprintln!(
                "stats:    scanned={} processed={} returned={}",
                s.bytes_scanned, s.bytes_processed, s.bytes_returned
            ),
            SelectEvent::End => {}
        }
        Ok(())
    });

    // Flush what was decoded even when the stream failed part-way.
    out.flush().context("cannot flush output")?;
    result?;

    info!(
        messages = decoder.messages_read(),
        records_bytes = written,
        "decode complete"
    );
    Ok(())
}
