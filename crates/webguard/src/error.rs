//! Error types shared across the instance.

use thiserror::Error;

/// Failures talking to the Core API.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The client is missing a base URL, API key or location, or was asked
    /// for jobs of a location it does not serve.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Core answered with a status code of 400 or above.
    #[error("core API returned status {code}")]
    Status { code: u16, body: String },

    #[error("core API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Core answered with a payload that is not a list of jobs.
    #[error("failed to decode core API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CoreError {
    /// Raw response body of a rejected request, if there is a non-blank one.
    pub fn status_body(&self) -> Option<&str> {
        match self {
            CoreError::Status { body, .. } if !body.trim().is_empty() => Some(body.as_str()),
            _ => None,
        }
    }
}

/// Failures resolving a monitoring target into a dialable address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("target is empty")]
    Empty,

    #[error("target host is empty")]
    EmptyHost,

    #[error("invalid port {0}")]
    InvalidPort(i64),

    #[error("invalid target URL: {0}")]
    Url(#[from] url::ParseError),
}

/// A job field that could not be coerced into its typed form.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value for `{field}`: {reason}")]
pub struct DecodeError {
    pub field: &'static str,
    pub reason: String,
}

impl DecodeError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self { field, reason: reason.into() }
    }
}

/// Failures loading the instance configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failures of a single HTTP probe request. Never escapes a probe strategy.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("monitoring target is empty")]
    EmptyTarget,

    #[error("failed to build probe client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("probe request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Failures constructing a run orchestrator.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to set up TLS: {0}")]
    Tls(#[from] rustls::Error),
}
