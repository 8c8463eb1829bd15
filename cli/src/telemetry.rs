use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::config::{LogFormat, LoggingConfig};

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr; stdout is reserved for command output.
pub fn init_telemetry(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_filter(&config.level)?;

    // Create the base registry
    let registry = Registry::default().with(env_filter);

    let installed = match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);

            registry.with(fmt_layer).try_init()
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_list(true)
                .flatten_event(true);

            registry.with(fmt_layer).try_init()
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            registry.with(fmt_layer).try_init()
        }
    };
    installed.context("Failed to install tracing subscriber")?;

    tracing::debug!(
        log_level = %config.level,
        log_format = ?config.format,
        "Telemetry initialized"
    );

    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn build_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log level configuration")
}

/// Log startup information
pub fn log_startup_info(config: &crate::config::Config) {
    let pool = config.database.pool_settings();
    tracing::info!(
        database_url = %config.redacted_database_url(),
        max_connections = pool.max_connections,
        min_connections = pool.min_connections,
        health_check_period_secs = pool.health_check_period.as_secs(),
        acquire_timeout_secs = pool.acquire_timeout.as_secs(),
        operation_timeout_secs = config.database.operation_timeout,
        "Scheduler starting up"
    );
}
