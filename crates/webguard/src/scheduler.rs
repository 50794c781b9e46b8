//! Wall-clock scheduling of runs on five-minute boundaries.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Length of one scheduling period, in milliseconds
pub const PERIOD_MILLIS: i64 = 5 * 60 * 1000;

/// The next instant strictly after `now` that is a multiple of five minutes
/// since the Unix epoch.
pub fn next_five_minute_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    let now_ms = now.timestamp_millis();
    let next_ms = (now_ms.div_euclid(PERIOD_MILLIS) + 1) * PERIOD_MILLIS;

    DateTime::from_timestamp_millis(next_ms)
        .unwrap_or_else(|| now + TimeDelta::milliseconds(PERIOD_MILLIS))
}

/// Call `task` on every five-minute boundary until `cancel` fires.
///
/// The wait is recomputed after each run so that a slow run never shifts the
/// cadence. A run in progress is not interrupted by cancellation.
pub async fn run_every_five_minutes<F, Fut>(cancel: CancellationToken, mut task: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        let now = Utc::now();
        let next = next_five_minute_boundary(now);
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        debug!(next_run = %next, "Waiting for next run");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }

        task().await;
    }

    info!("Scheduler stopped");
}
