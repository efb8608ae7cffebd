//! Logging initialization for the store binary
//!
//! Supports configuration-based logging with file rotation, JSON formatting, and
//! `RUST_LOG` overrides.

use std::fs;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Keeps the non-blocking file writer flushing until dropped
pub struct LogGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initialize logging from `LoggingConfig`
///
/// Returns a `LogGuard` that must be kept alive for the program duration,
/// otherwise buffered file output may be lost.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LogGuard> {
    let subscriber = tracing_subscriber::registry().with(build_env_filter(config));

    let file_guard = if config.json {
        init_json_logging_with_subscriber(subscriber, config)?
    } else {
        init_human_logging_with_subscriber(subscriber, config)?
    };

    tracing::info!(
        service_name = %config.service_name,
        json = config.json,
        file_enabled = config.file_enabled,
        "Logging initialized"
    );

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // sqlx logs every statement at info
        EnvFilter::new(format!(
            "medreq_store={},medreq_models={},sqlx=warn",
            config.level, config.level
        ))
    })
}

fn init_json_logging_with_subscriber<S>(
    subscriber: S,
    config: &LoggingConfig,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>>
where
    S: SubscriberExt
        + for<'a> tracing_subscriber::registry::LookupSpan<'a>
        + Send
        + Sync
        + 'static,
{
    let console_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(std::io::stderr);

    if config.file_enabled {
        let (file_appender, file_guard) = create_file_appender(config)?;
        let file_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(file_appender);

        subscriber.with(console_layer).with(file_layer).try_init()?;
        Ok(Some(file_guard))
    } else {
        subscriber.with(console_layer).try_init()?;
        Ok(None)
    }
}

fn init_human_logging_with_subscriber<S>(
    subscriber: S,
    config: &LoggingConfig,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>>
where
    S: SubscriberExt
        + for<'a> tracing_subscriber::registry::LookupSpan<'a>
        + Send
        + Sync
        + 'static,
{
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if config.file_enabled {
        let (file_appender, file_guard) = create_file_appender(config)?;
        let file_layer = fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(file_appender);

        subscriber.with(console_layer).with(file_layer).try_init()?;
        Ok(Some(file_guard))
    } else {
        subscriber.with(console_layer).try_init()?;
        Ok(None)
    }
}

fn create_file_appender(
    config: &LoggingConfig,
) -> anyhow::Result<(
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
)> {
    fs::create_dir_all(&config.file_directory)?;

    let dir = &config.file_directory;
    let prefix = &config.file_prefix;
    let file_appender = match config.file_rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(dir, prefix),
        "minutely" => tracing_appender::rolling::minutely(dir, prefix),
        "never" => tracing_appender::rolling::never(dir, format!("{prefix}.log")),
        _ => tracing_appender::rolling::daily(dir, prefix),
    };

    Ok(tracing_appender::non_blocking(file_appender))
}

/// Initialize logging from `RUST_LOG` only
///
/// For tests and one-off tools. Safe to call more than once.
pub fn init_simple_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medreq_store=info,sqlx=warn".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
