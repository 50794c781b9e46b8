use std::sync::Arc;

use super::checker::Checker;
use super::http::{HttpChecker, KeywordChecker};
use super::tcp::{PingChecker, PortChecker};
use super::ProbeOutcome;
use crate::monitor::{MonitorType, Monitoring};

/// Probe executor - picks the check strategy for a job and runs it
pub struct ProbeExecutor {
    http_checker: Arc<dyn Checker>,
    keyword_checker: Arc<dyn Checker>,
    ping_checker: Arc<dyn Checker>,
    port_checker: Arc<dyn Checker>,
}

impl Default for ProbeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeExecutor {
    /// Create an executor with the standard strategies
    pub fn new() -> Self {
        Self::with_checkers(
            Arc::new(HttpChecker),
            Arc::new(KeywordChecker),
            Arc::new(PingChecker::default()),
            Arc::new(PortChecker::default()),
        )
    }

    /// Create an executor with custom strategies
    pub fn with_checkers(
        http_checker: Arc<dyn Checker>,
        keyword_checker: Arc<dyn Checker>,
        ping_checker: Arc<dyn Checker>,
        port_checker: Arc<dyn Checker>,
    ) -> Self {
        Self { http_checker, keyword_checker, ping_checker, port_checker }
    }

    /// Execute the response check for `job`.
    ///
    /// Jobs of an unrecognised type are reported as unknown without touching
    /// the network.
    pub async fn execute_check(&self, job: &Monitoring) -> ProbeOutcome {
        let checker: &dyn Checker = match job.monitor_type {
            MonitorType::Http => self.http_checker.as_ref(),
            MonitorType::Keyword => self.keyword_checker.as_ref(),
            MonitorType::Ping => self.ping_checker.as_ref(),
            MonitorType::Port => self.port_checker.as_ref(),
            MonitorType::Other(_) => return ProbeOutcome::unknown(),
        };

        checker.check(job).await
    }
}
