//! Core API access.
//!
//! The [`CoreApi`] trait is the seam between the run orchestrator and Core;
//! [`CoreClient`] is the HTTP implementation used in production.

mod client;

pub use client::CoreClient;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::monitor::{MonitorType, Monitoring, MonitoringResponsePayload, SslResultPayload};

/// Operations the instance needs from Core
#[async_trait]
pub trait CoreApi: Send + Sync {
    /// Fetch the jobs for `location`.
    ///
    /// With no type filters a single unfiltered fetch is issued. Otherwise one
    /// fetch is issued per distinct type and the results are merged, keeping
    /// the first occurrence of each job id.
    async fn fetch_jobs(
        &self,
        location: &str,
        types: &[MonitorType],
    ) -> Result<Vec<Monitoring>, CoreError>;

    /// Report the outcome of a response check
    async fn post_response_result(
        &self,
        payload: &MonitoringResponsePayload,
    ) -> Result<(), CoreError>;

    /// Report the outcome of a certificate check
    async fn post_ssl_result(&self, payload: &SslResultPayload) -> Result<(), CoreError>;
}
