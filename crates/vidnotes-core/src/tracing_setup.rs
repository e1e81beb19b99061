use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable naming a file to receive debug-level logs.
pub const LOG_FILE_ENV: &str = "VIDNOTES_LOG_FILE";

pub fn init_tracing() {
    let log_file = std::env::var(LOG_FILE_ENV).ok();
    init_tracing_with_file(log_file.as_deref().map(Path::new));
}

/// Install the global subscriber: compact stderr output filtered by
/// `RUST_LOG` (default `warn`), plus an optional debug-level file layer.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing_with_file(log_file: Option<&Path>) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        );

    let file_layer = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG),
            ),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", path.display(), e);
                None
            }
        }
    });

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}
