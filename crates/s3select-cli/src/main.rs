/// S3 Select event-stream tool: inspect, validate, decode, and build the
/// binary bodies returned by Select Object Content.
///
/// # Command overview
///
/// ```text
/// s3select <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print one line per message (offsets, lengths, types, CRCs)
///   validate   Check framing, checksums, and headers of every message
///   decode     Write the Records payload; report Progress/Stats
///   encode     Build an event stream from a JSON manifest
///   help       Print help information
///
/// Global options:
///   -v, --verbose    More log output on stderr (repeat for trace)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                              |
/// |------|------------------------------------------------------|
/// | 0    | Success                                              |
/// | 1    | Error (I/O failure, corrupt stream, server error...) |
///
/// All diagnostics are written to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};

mod cmd_decode;
mod cmd_encode;
mod cmd_inspect;
mod cmd_validate;
mod logging;

// ── CLI root ──────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "s3select", version, about = "S3 Select event-stream CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print a summary line for each message in an event stream.
    Inspect(InspectArgs),
    /// Check an event stream for structural correctness.
    Validate(ValidateArgs),
    /// Decode an event stream into its query results.
    Decode(DecodeArgs),
    /// Build an event stream from a JSON manifest.
    Encode(EncodeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `s3select inspect`.
///
/// ```text
/// ┌────────────────┬──────────────────────────────────────────────────┐
/// │ Flag           │ Effect                                           │
/// ├────────────────┼──────────────────────────────────────────────────┤
/// │ --show-headers │ List every header name and value                 │
/// │ --show-payload │ Hex dump of the first 64 payload bytes           │
/// └────────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the event-stream body.
    pub file: PathBuf,

    /// List all headers of each message.
    #[arg(long)]
    pub show_headers: bool,

    /// Hex dump the start of each payload (16 bytes per line).
    #[arg(long)]
    pub show_payload: bool,
}

/// Arguments for `s3select validate`.
///
/// Reads every message to the end of the file, including any after End,
/// and exits 1 on the first problem.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the event-stream body.
    pub file: PathBuf,
}

/// Arguments for `s3select decode`.
///
/// Records are written as they are decoded; Progress and Stats go to
/// stderr. A server error, corrupt message, or missing End exits 1 after
/// whatever Records preceded it have been written.
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Path to the event-stream body.
    pub file: PathBuf,

    /// Write Records to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Reject messages larger than this many bytes.
    #[arg(long, default_value_t = s3select_wire::prelude::DEFAULT_MAX_MESSAGE_LEN)]
    pub max_message_len: u32,
}

/// Arguments for `s3select encode`.
///
/// See [`cmd_encode`] for the manifest format.
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// Path to the JSON manifest describing the messages.
    pub input: PathBuf,

    /// Output file for the encoded stream.
    #[arg(short, long)]
    pub output: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
        Commands::Decode(args) => cmd_decode::run(&args),
        Commands::Encode(args) => cmd_encode::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
