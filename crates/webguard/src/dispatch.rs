//! Bounded fan-out of one fetched batch to a pool of workers.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::monitor::Monitoring;

/// What one phase does with each job of its batch.
///
/// Both methods handle their own failures; nothing is reported back to the
/// dispatcher.
#[async_trait]
pub trait PhaseHandler: Send + Sync + 'static {
    /// Probe the job and post its result
    async fn execute(&self, job: &Monitoring);

    /// Handle a job whose maintenance window is active. Never probes.
    async fn skip_maintenance(&self, job: &Monitoring);
}

/// Aggregate counts for one dispatched batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub total: usize,
    pub dispatched: usize,
    pub skipped_maintenance: usize,
}

/// Run `jobs` through `handler` on at most `max(1, workers)` concurrent tasks.
///
/// Returns once every dispatched job has finished. Cancellation stops further
/// jobs from being handed out and from being started; jobs a worker already
/// started run to completion. A job only counts as dispatched once a worker
/// starts it.
pub async fn run_batch<H: PhaseHandler>(
    jobs: Vec<Monitoring>,
    handler: Arc<H>,
    workers: usize,
    cancel: &CancellationToken,
) -> DispatchSummary {
    let mut summary = DispatchSummary { total: jobs.len(), ..Default::default() };
    if jobs.is_empty() {
        return summary;
    }

    let (tx, rx) = mpsc::channel::<Monitoring>(1);
    let rx = Arc::new(Mutex::new(rx));

    let mut pool = JoinSet::new();
    for worker in 0..workers.max(1) {
        let rx = rx.clone();
        let handler = handler.clone();
        let cancel = cancel.clone();
        pool.spawn(async move {
            let mut started = 0;
            loop {
                let next = rx.lock().await.recv().await;
                let Some(job) = next else { break };
                if cancel.is_cancelled() {
                    debug!(worker, monitoring_id = %job.id, "Run cancelled, dropping job");
                    continue;
                }

                debug!(worker, monitoring_id = %job.id, "Executing job");
                started += 1;
                handler.execute(&job).await;
            }
            started
        });
    }

    for job in jobs {
        if cancel.is_cancelled() {
            break;
        }

        if job.maintenance_active {
            debug!(monitoring_id = %job.id, "Maintenance window active, skipping probe");
            handler.skip_maintenance(&job).await;
            summary.skipped_maintenance += 1;
            continue;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = tx.send(job) => {
                if sent.is_err() {
                    error!("All dispatch workers have stopped");
                    break;
                }
            }
        }
    }

    drop(tx);
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(started) => summary.dispatched += started,
            Err(e) => error!("Dispatch worker failed: {}", e),
        }
    }

    summary
}
