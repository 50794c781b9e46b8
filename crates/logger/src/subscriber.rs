use std::env::var;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the output format
pub const LOG_FORMAT_VAR: &str = "RUST_LOG_FORMAT";

/// Output format of the log lines
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line
    Json,

    /// Human readable, without timestamps
    #[default]
    Compact,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }

    fn from_env() -> Self {
        var(LOG_FORMAT_VAR).map(|raw| Self::parse(&raw)).unwrap_or_default()
    }
}

/// Install the global subscriber at `INFO`, honouring `RUST_LOG` and
/// `RUST_LOG_FORMAT`.
pub fn init_tracing() -> Result<(), TryInitError> {
    init_tracing_with(LevelFilter::INFO, LogFormat::from_env())
}

/// Install the global subscriber with an explicit default level and format.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing_with(level: LevelFilter, format: LogFormat) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(log_layer).try_init()
}
