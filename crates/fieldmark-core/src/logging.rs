use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Once;
use tracing::Level;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    filter::EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

// Log targets
pub const FIELD_MAPPING: &str = "fieldmark::mapper";
pub const MATCH_LOCATOR: &str = "fieldmark::locator";
pub const RECT_BUILDER: &str = "fieldmark::rects";
pub const INPUT_OPERATIONS: &str = "fieldmark::input";

const ENGINE_TARGETS: &[&str] = &[FIELD_MAPPING, MATCH_LOCATOR, RECT_BUILDER, INPUT_OPERATIONS];

static INIT: Once = Once::new();

fn engine_filter(level: Level) -> EnvFilter {
    let directives = ENGINE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level.as_str().to_ascii_lowercase()))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("warn,{directives}")))
}

/// Logs to stderr. `debug` raises the engine targets from `info` to `debug`;
/// `RUST_LOG` overrides both.
pub fn init_logging(debug: bool) -> WorkerGuard {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(writer)
                    .with_filter(engine_filter(level)),
            )
            .try_init();
    });

    guard
}

/// Like [`init_logging`], plus a full debug log of every mapping pass in
/// `log_dir/fieldmark.log`.
pub fn init_logging_with_dir(debug: bool, log_dir: &Path) -> Result<(WorkerGuard, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, "fieldmark.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());

    let level = if debug { Level::DEBUG } else { Level::INFO };

    INIT.call_once(|| {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .with_writer(file_writer)
            .with_filter(engine_filter(Level::DEBUG));

        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(stderr_writer)
            .with_filter(engine_filter(level));

        let _ = tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer)
            .try_init();
    });

    Ok((file_guard, stderr_guard))
}
