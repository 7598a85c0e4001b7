use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Settings;

/// Installs the global subscriber: console output plus a daily rotating file
/// at `<dir>/<file_prefix>.YYYY-MM-DD`.
///
/// The returned guard flushes the file writer on drop and must outlive the
/// server.
pub fn init(settings: &Settings) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(&settings.log.dir)?;

    let file_appender =
        tracing_appender::rolling::daily(&settings.log.dir, &settings.log.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    Ok(guard)
}
