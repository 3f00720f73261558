use crate::config::{AppConfig, Rotation};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Keep the guard alive for the life of
/// the process or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    // The appender creates `log_dir` on first write
    let (dir, file) = (&config.log_dir, &config.log_file);
    let file_appender = match config.rotation {
        Rotation::Hourly => tracing_appender::rolling::hourly(dir, file),
        Rotation::Daily => tracing_appender::rolling::daily(dir, file),
        Rotation::Never => tracing_appender::rolling::never(dir, file),
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG wins over the config file
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}
