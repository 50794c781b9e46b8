//! Result payloads posted back to Core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::Status;

/// Outcome of a response check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringResponsePayload {
    pub monitoring_id: String,

    pub status: Status,

    /// Milliseconds, rounded to two decimals
    pub response_time: Option<f64>,
}

impl MonitoringResponsePayload {
    pub fn new(monitoring_id: impl Into<String>, status: Status, response_time: Option<f64>) -> Self {
        Self { monitoring_id: monitoring_id.into(), status, response_time }
    }

    /// Result posted for a job whose maintenance window is active
    pub fn maintenance(monitoring_id: impl Into<String>) -> Self {
        Self::new(monitoring_id, Status::Unknown, None)
    }
}

/// Outcome of a certificate check.
///
/// `expires_at`, `issuer` and `issued_at` are only ever set when `is_valid` is
/// true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslResultPayload {
    pub monitoring_id: String,
    pub is_valid: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub issuer: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl SslResultPayload {
    /// The default verdict for any certificate that could not be proven valid
    pub fn invalid(monitoring_id: impl Into<String>) -> Self {
        Self {
            monitoring_id: monitoring_id.into(),
            is_valid: false,
            expires_at: None,
            issuer: None,
            issued_at: None,
        }
    }

    pub fn valid(
        monitoring_id: impl Into<String>,
        expires_at: DateTime<Utc>,
        issued_at: DateTime<Utc>,
        issuer: Option<String>,
    ) -> Self {
        Self {
            monitoring_id: monitoring_id.into(),
            is_valid: true,
            expires_at: Some(expires_at),
            issuer,
            issued_at: Some(issued_at),
        }
    }
}
