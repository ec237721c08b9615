use anyhow::Context;
use tracing::level_filters::LevelFilter;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::AppConfig;

const DEFAULT_FILTER: &str = "bizcards=debug,axum=info,tower_http=info";

/// Daily file `<dir>/YYYY-MM-DD.error.log`.
pub fn error_log_appender(dir: &str) -> anyhow::Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_suffix("error.log")
        .build(dir)
        .with_context(|| format!("open error log in {dir}"))
}

/// Installs the console subscriber (filtered by `RUST_LOG`) and the daily
/// error file, which receives every warning and error. Keep the guard alive
/// for the life of the process.
pub fn init(config: &AppConfig) -> anyhow::Result<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console: Box<dyn Layer<Registry> + Send + Sync> = if config.json_logs() {
        fmt::layer().with_target(false).json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let (writer, guard) = tracing_appender::non_blocking(error_log_appender(&config.log.dir)?);
    let error_file = fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(console.with_filter(env_filter))
        .with(error_file)
        .init();
    Ok(guard)
}
