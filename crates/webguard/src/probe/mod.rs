//! Probe strategies.
//!
//! This module is responsible for:
//! - Executing http, keyword, ping and port checks against live targets
//! - Validating TLS certificates for the SSL phase
//! - Measuring response times

pub mod checker;
pub mod executor;
pub mod http;
pub mod ssl;
pub mod tcp;

use std::time::Duration;

pub use checker::Checker;
pub use executor::ProbeExecutor;
pub use http::{HttpChecker, HttpReply, KeywordChecker, perform_request};
pub use ssl::SslValidator;
pub use tcp::{PingChecker, PortChecker};

use crate::monitor::Status;

/// What a response check observed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOutcome {
    pub status: Status,

    /// Milliseconds, rounded to two decimals
    pub response_time: Option<f64>,
}

impl ProbeOutcome {
    pub fn up(elapsed: Duration) -> Self {
        Self { status: Status::Up, response_time: Some(round_millis(elapsed)) }
    }

    /// Down, with the time it took to find out
    pub fn down_after(elapsed: Duration) -> Self {
        Self { status: Status::Down, response_time: Some(round_millis(elapsed)) }
    }

    pub fn down() -> Self {
        Self { status: Status::Down, response_time: None }
    }

    pub fn unknown() -> Self {
        Self { status: Status::Unknown, response_time: None }
    }
}

/// Milliseconds with two decimals, computed from microsecond precision.
pub fn round_millis(elapsed: Duration) -> f64 {
    let millis = elapsed.as_micros() as f64 / 1000.0;
    (millis * 100.0).round() / 100.0
}
