use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;
use crate::utils;

/// Set up application logging based on configuration
///
/// The returned guard must stay alive for the lifetime of the process,
/// otherwise buffered log lines are dropped on exit.
pub fn setup_logging(config: &Config) -> tracing_appender::non_blocking::WorkerGuard {
    // RUST_LOG takes precedence over the configured level
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    if config.log_file_path().is_none() {
        // When no file path is specified, log only to stderr
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set global tracing subscriber");

        // Return a dummy guard - we still need to return the same type
        let (_dummy_writer, guard) = tracing_appender::non_blocking(
            tracing_appender::rolling::never(std::env::temp_dir(), "unused.log"),
        );

        guard
    } else {
        let log_path = utils::get_log_file_path(config);
        let log_dir = log_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        if !log_dir.as_os_str().is_empty() {
            std::fs::create_dir_all(&log_dir).expect("Failed to create log directory");
        }

        let log_file_name = log_path
            .file_name()
            .unwrap_or(std::ffi::OsStr::new("tradepost.log"))
            .to_os_string();

        // No rotation for operator-specified paths
        let file_appender = tracing_appender::rolling::never(&log_dir, log_file_name);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(file_writer)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set global tracing subscriber");

        guard
    }
}
