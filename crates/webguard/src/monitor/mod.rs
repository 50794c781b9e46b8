//! Monitoring data model.
//!
//! Jobs are decoded tolerantly from Core's wire format (see [`wire`]) into
//! strongly typed [`Monitoring`] records; results travel back as
//! [`MonitoringResponsePayload`] and [`SslResultPayload`].

pub mod payload;
pub mod types;
pub mod wire;

pub use payload::{MonitoringResponsePayload, SslResultPayload};
pub use types::{HttpMethod, MonitorType, Monitoring, Status};
