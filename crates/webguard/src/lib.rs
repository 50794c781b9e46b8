//! Webguard - distributed monitoring probe instance
//!
//! This library fetches monitoring jobs for one location from the Core API,
//! probes each target and reports the observed status and certificate
//! validity back to Core.

pub mod config;
pub mod core_api;
pub mod dispatch;
pub mod error;
pub mod monitor;
pub mod probe;
pub mod runner;
pub mod scheduler;
pub mod target;

// Re-export main types
pub use config::Config;
pub use core_api::{CoreApi, CoreClient};
pub use dispatch::{DispatchSummary, PhaseHandler, run_batch};
pub use error::{ConfigError, CoreError, DecodeError, ProbeError, RunnerError, TargetError};
pub use monitor::{
    HttpMethod, MonitorType, Monitoring, MonitoringResponsePayload, SslResultPayload, Status,
};
pub use probe::{ProbeExecutor, ProbeOutcome, SslValidator};
pub use runner::{RunReport, Runner};

/// Re-export the cancellation primitive used by runs and the scheduler
pub use tokio_util::sync::CancellationToken;
