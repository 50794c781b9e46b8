//! Run orchestration.
//!
//! One run consists of two phases executed side by side:
//! - the response phase, covering jobs of every type
//! - the SSL phase, covering only the types that expose a certificate
//!
//! A phase failing to fetch its batch never affects the other one.

mod phases;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::core_api::{CoreApi, CoreClient};
use crate::dispatch::{DispatchSummary, PhaseHandler, run_batch};
use crate::error::{CoreError, RunnerError};
use crate::monitor::MonitorType;
use crate::probe::{ProbeExecutor, SslValidator};

use phases::{ResponseCheck, SslCheck};

/// Outcome of one run. A phase is `None` when its batch could not be
/// fetched or the run was cancelled before fetching.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub response: Option<DispatchSummary>,
    pub ssl: Option<DispatchSummary>,
}

impl RunReport {
    /// True when both phases fetched and dispatched their batch
    pub fn is_complete(&self) -> bool {
        self.response.is_some() && self.ssl.is_some()
    }
}

/// Run orchestrator
pub struct Runner {
    client: Arc<dyn CoreApi>,
    location: String,
    workers: usize,
    executor: Arc<ProbeExecutor>,
    validator: Arc<SslValidator>,
}

impl Runner {
    pub fn new(
        client: Arc<dyn CoreApi>,
        config: &Config,
        executor: Arc<ProbeExecutor>,
        validator: Arc<SslValidator>,
    ) -> Self {
        Self {
            client,
            location: config.location.trim().to_string(),
            workers: config.worker_count(),
            executor,
            validator,
        }
    }

    /// Build a runner talking to the Core API described by `config`
    pub fn from_config(config: &Config) -> Result<Self, RunnerError> {
        let client = CoreClient::from_config(config)?;
        let validator = SslValidator::new()?;

        Ok(Self::new(
            Arc::new(client),
            config,
            Arc::new(ProbeExecutor::new()),
            Arc::new(validator),
        ))
    }

    /// Execute one run: both phases concurrently, waiting for both.
    ///
    /// Never fails. Problems are logged and reflected in the report.
    pub async fn run_once(&self, cancel: &CancellationToken) -> RunReport {
        info!(location = %self.location, workers = self.workers, "Dispatching monitoring jobs");

        let response = ResponseCheck { client: self.client.clone(), executor: self.executor.clone() };
        let ssl = SslCheck { client: self.client.clone(), validator: self.validator.clone() };

        let (response, ssl) = tokio::join!(
            self.run_phase("response", &[], Arc::new(response), cancel),
            self.run_phase("SSL", &MonitorType::SSL_TYPES, Arc::new(ssl), cancel),
        );

        info!("All monitoring jobs have been dispatched");
        RunReport { response, ssl }
    }

    async fn run_phase<H: PhaseHandler>(
        &self,
        phase: &'static str,
        types: &[MonitorType],
        handler: Arc<H>,
        cancel: &CancellationToken,
    ) -> Option<DispatchSummary> {
        if cancel.is_cancelled() {
            info!(phase, "Run cancelled, skipping fetch");
            return None;
        }

        let jobs = match self.client.fetch_jobs(&self.location, types).await {
            Ok(jobs) => jobs,
            Err(e) => {
                log_fetch_error(phase, &e);
                return None;
            }
        };

        if jobs.is_empty() {
            info!(phase, "No active {} monitoring found.", phase);
            return Some(DispatchSummary::default());
        }

        let summary = run_batch(jobs, handler, self.workers, cancel).await;
        info!(
            phase,
            total = summary.total,
            dispatched = summary.dispatched,
            skipped_maintenance = summary.skipped_maintenance,
            "Phase finished"
        );

        Some(summary)
    }
}

fn log_fetch_error(phase: &str, e: &CoreError) {
    error!(phase, "Failed to fetch monitorings from the Core API.");
    match e.status_body() {
        Some(body) => error!(phase, "{}: {}", e, body),
        None => error!(phase, "{}", e),
    }
}

