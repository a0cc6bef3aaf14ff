//! Log subscriber setup.
//!
//! Logs go to stderr so that `decode` output on stdout stays pipeable.
//! `RUST_LOG` wins over `-v` when set.

use anyhow::{Context, Result, anyhow};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `verbose` counts `-v` flags: none logs warnings, one adds debug
/// output (skipped messages, state transitions), two or more add a
/// trace line per message.
pub fn init(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let directives = ["s3select", "s3select_wire", "s3select_decoder", "s3select_encoder"]
        .map(|target| format!("{target}={level}"))
        .join(",");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}
