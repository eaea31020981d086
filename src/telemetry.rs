use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize structured logging on stderr.
///
/// `RUST_LOG`, when set, wins over the configured level so a single module can be
/// turned up without touching the config file.
pub fn init_telemetry(level: Level, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    tracing::debug!(%level, json, "pullme telemetry initialized");
    Ok(())
}

/// Accepts level names (`warn`, `DEBUG`) and the numeric 0-5 scale used by older
/// deployments, where 0 is the quietest.
pub fn parse_log_level(value: &str) -> Result<Level> {
    let value = value.trim();
    if let Ok(number) = value.parse::<u8>() {
        return match number {
            0 => Ok(Level::ERROR),
            1 => Ok(Level::WARN),
            2 | 3 => Ok(Level::INFO),
            4 => Ok(Level::DEBUG),
            5 => Ok(Level::TRACE),
            other => Err(anyhow!("Log level {other} is out of range (0-5)")),
        };
    }

    value
        .parse::<Level>()
        .map_err(|_| anyhow!("Unknown log level '{value}'"))
}

/// Generate a correlation ID for linking the log lines of one run
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn create_run_span(repository: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "reminder_run",
        repository = repository,
        correlation.id = correlation_id,
    )
}
