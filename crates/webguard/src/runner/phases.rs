use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::core_api::CoreApi;
use crate::dispatch::PhaseHandler;
use crate::error::CoreError;
use crate::monitor::{Monitoring, MonitoringResponsePayload};
use crate::probe::{ProbeExecutor, SslValidator};

/// Response phase: probe every job and post its status
pub(crate) struct ResponseCheck {
    pub(crate) client: Arc<dyn CoreApi>,
    pub(crate) executor: Arc<ProbeExecutor>,
}

#[async_trait]
impl PhaseHandler for ResponseCheck {
    async fn execute(&self, job: &Monitoring) {
        let outcome = self.executor.execute_check(job).await;
        debug!(
            monitoring_id = %job.id,
            monitor_type = %job.monitor_type,
            status = %outcome.status,
            response_time = ?outcome.response_time,
            "Response check finished"
        );

        let payload = MonitoringResponsePayload::new(&job.id, outcome.status, outcome.response_time);
        if let Err(e) = self.client.post_response_result(&payload).await {
            log_post_error("response", &job.id, &e);
        }
    }

    async fn skip_maintenance(&self, job: &Monitoring) {
        let payload = MonitoringResponsePayload::maintenance(&job.id);
        if let Err(e) = self.client.post_response_result(&payload).await {
            log_post_error("response", &job.id, &e);
        }
    }
}

/// SSL phase: validate every job's certificate and post the verdict
pub(crate) struct SslCheck {
    pub(crate) client: Arc<dyn CoreApi>,
    pub(crate) validator: Arc<SslValidator>,
}

#[async_trait]
impl PhaseHandler for SslCheck {
    async fn execute(&self, job: &Monitoring) {
        let payload = self.validator.validate(job).await;
        debug!(monitoring_id = %job.id, is_valid = payload.is_valid, "SSL check finished");

        if let Err(e) = self.client.post_ssl_result(&payload).await {
            log_post_error("SSL", &job.id, &e);
        }
    }

    // Maintenance jobs get no SSL result at all.
    async fn skip_maintenance(&self, _job: &Monitoring) {}
}

fn log_post_error(kind: &str, monitoring_id: &str, e: &CoreError) {
    match e.status_body() {
        Some(body) => {
            error!(%monitoring_id, "Failed to post {} result: {}: {}", kind, e, body)
        }
        None => error!(%monitoring_id, "Failed to post {} result: {}", kind, e),
    }
}
