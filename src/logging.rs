use std::path::Path;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the non-blocking log writer alive; drop it to flush.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Send `tracing` output to a daily log file under `log_dir`.
///
/// The terminal belongs to the game, so there is no stdout layer. If the
/// directory cannot be created logging stays off.
pub fn init_logging(log_dir: Option<&Path>) -> LoggingGuard {
    let Some(log_dir) = log_dir else {
        return LoggingGuard { _file_guard: None };
    };
    if std::fs::create_dir_all(log_dir).is_err() {
        return LoggingGuard { _file_guard: None };
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_appender = tracing_appender::rolling::daily(log_dir, "guessr.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .with_ansi(false)
        .compact()
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok();

    LoggingGuard {
        _file_guard: Some(guard),
    }
}
