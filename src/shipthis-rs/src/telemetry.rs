//! Tracing setup for programs built on this client
//!
//! The library itself only emits `tracing` events. Binaries and demos call
//! [`init_telemetry`] once to get:
//! - JSON formatted logs to `./logs/shipthis.log`
//! - Human-readable console output
//! - Size-based (10MB) and daily rotation

use anyhow::Result;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const DEFAULT_FILTER: &str = "shipthis_rs=info,shipthis_core=info";

/// Initialize tracing with file and console output
///
/// Returns a guard that must be kept alive to ensure logs are flushed
pub fn init_telemetry(log_dir: impl AsRef<Path>) -> Result<WorkerGuard> {
    // Create the log directory if it doesn't exist
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)?;

    // Rotates when the file reaches 10MB or daily, whichever comes first
    let file_appender = RollingFileAppender::new(
        log_dir.join("shipthis.log"),
        RollingConditionBasic::new()
            .daily()
            .max_size(10 * 1024 * 1024), // 10 MB
        9, // Keep up to 10 files per day (0-9)
    )?;

    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG wins over the default filter
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // JSON file layer for structured logging
    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_target(true)
        .with_thread_ids(true);

    // Console layer on stderr so demos can keep stdout for results
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // Fails if a global subscriber is already installed
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::debug!("Telemetry initialized with file logging to {:?}", log_dir);

    Ok(guard)
}
