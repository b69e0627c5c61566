pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod inspector;
pub mod json;
pub mod models;
pub mod package;
pub mod persistence;
pub mod preview;
pub mod schema;
pub mod source_map;
pub mod state;
pub mod viewport;

use tracing_appender::non_blocking::WorkerGuard;

/// Install the global tracing subscriber.
///
/// Logs are written to a rolling-never (single) file in the OS data dir:
///   Linux    ~/.local/share/apl-preview/apl-preview.log
///   macOS    ~/Library/Application Support/apl-preview/apl-preview.log
///   Windows  %LOCALAPPDATA%\apl-preview\apl-preview.log
///
/// Log level is controlled by the RUST_LOG environment variable;
/// defaults to INFO when the variable is absent. The returned guard flushes
/// the writer on drop and must be held until the process exits.
pub fn init_tracing() -> WorkerGuard {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_default()
        .join("apl-preview");

    // tracing_appender::rolling::never panics if it cannot open the log file.
    let _ = std::fs::create_dir_all(&log_dir);

    let file_appender = tracing_appender::rolling::never(&log_dir, "apl-preview.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .init();

    tracing::info!("apl-preview {} starting", env!("CARGO_PKG_VERSION"));
    guard
}
