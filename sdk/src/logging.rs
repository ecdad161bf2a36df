//! # Structured Logging
//!
//! The SDK logs through `tracing` and never installs a subscriber on its
//! own. Applications that already have one keep it. Applications that don't
//! can call [`init_logging`] once at startup.
//!
//! Useful targets:
//!
//! ```text
//! RUST_LOG=nova_sdk=debug                    every attempt, every backoff
//! RUST_LOG=nova_sdk::execute=debug           just the retry loop
//! RUST_LOG=nova_sdk::network=trace           node selection decisions
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Error, Result};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, colored output.
    Pretty,
    /// JSON lines for log aggregation.
    Json,
}

impl LogFormat {
    /// Accepts "json" or "pretty" (case-insensitive). Anything else is `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install a global tracing subscriber writing to stderr.
///
/// `RUST_LOG` overrides `default_level` when set. Fails with
/// [`Error::Config`] if a global subscriber is already installed, so tests
/// and embedding applications can call it without panicking.
pub fn init_logging(default_level: &str, format: LogFormat) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
    };
    installed.map_err(|e| Error::Config(format!("logging already initialized: {e}")))?;

    tracing::info!("logging initialized (format={:?})", format);
    Ok(())
}
