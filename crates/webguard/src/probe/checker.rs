use async_trait::async_trait;

use super::ProbeOutcome;
use crate::monitor::Monitoring;

/// A strategy that performs one kind of response check.
///
/// Implementations never fail: every error is folded into the returned
/// outcome.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Perform the check for `job` and report what was observed
    async fn check(&self, job: &Monitoring) -> ProbeOutcome;
}
