//! Monitoring job definitions as handed out by Core.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::wire::RawMonitoring;

/// Kind of check a monitoring job asks for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MonitorType {
    Http,
    Ping,
    Keyword,
    Port,
    /// A type this instance does not know how to probe
    Other(String),
}

impl MonitorType {
    /// Types that carry a certificate worth validating in the SSL phase
    pub const SSL_TYPES: [MonitorType; 3] =
        [MonitorType::Http, MonitorType::Keyword, MonitorType::Port];

    pub fn as_str(&self) -> &str {
        match self {
            MonitorType::Http => "http",
            MonitorType::Ping => "ping",
            MonitorType::Keyword => "keyword",
            MonitorType::Port => "port",
            MonitorType::Other(other) => other.as_str(),
        }
    }
}

impl From<&str> for MonitorType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => MonitorType::Http,
            "ping" => MonitorType::Ping,
            "keyword" => MonitorType::Keyword,
            "port" => MonitorType::Port,
            _ => MonitorType::Other(value.to_string()),
        }
    }
}

impl std::fmt::Display for MonitorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed state of a monitoring target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
    Unknown,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Up => write!(f, "up"),
            Status::Down => write!(f, "down"),
            Status::Unknown => write!(f, "unknown"),
        }
    }
}

/// HTTP verb used by http and keyword checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Parse a method name, falling back to GET for anything unrecognised.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "post" => HttpMethod::Post,
            "put" => HttpMethod::Put,
            "patch" => HttpMethod::Patch,
            "delete" => HttpMethod::Delete,
            _ => HttpMethod::Get,
        }
    }

    /// GET and DELETE requests never carry a body.
    pub fn allows_body(self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }

    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One monitoring job fetched from Core.
///
/// Decoding goes through [`RawMonitoring`], which accepts numbers, strings and
/// booleans interchangeably for every scalar field before the typed record is
/// built.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawMonitoring")]
pub struct Monitoring {
    /// Opaque job identity, always carried as a string
    pub id: String,

    pub monitor_type: MonitorType,

    /// URL or bare `host[:port]`
    pub target: String,

    /// Request timeout in seconds; zero or less means no explicit timeout
    pub timeout: i64,

    pub http_method: HttpMethod,

    /// Free-form header map, either a JSON object or a string holding one
    pub http_headers: Option<Value>,

    /// Free-form request body
    pub http_body: Option<Value>,

    pub auth_username: String,
    pub auth_password: String,

    /// Substring expected in the body of keyword checks
    pub keyword: String,

    /// Port for port checks, optional for ping checks
    pub port: i64,

    pub maintenance_active: bool,
}

impl Monitoring {
    /// Create a job with the given identity and everything else defaulted.
    pub fn new(id: impl Into<String>, monitor_type: MonitorType, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            monitor_type,
            target: target.into(),
            timeout: 0,
            http_method: HttpMethod::Get,
            http_headers: None,
            http_body: None,
            auth_username: String::new(),
            auth_password: String::new(),
            keyword: String::new(),
            port: 0,
            maintenance_active: false,
        }
    }

    /// Basic-auth credentials, present only when both parts are non-empty.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        if self.auth_username.is_empty() || self.auth_password.is_empty() {
            return None;
        }
        Some((self.auth_username.as_str(), self.auth_password.as_str()))
    }
}
