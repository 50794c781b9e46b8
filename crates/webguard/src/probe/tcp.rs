//! TCP reachability checks.

use std::io;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::{Checker, ProbeOutcome};
use crate::monitor::Monitoring;
use crate::target::address_for_port;

/// Dial timeout shared by ping and port checks
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Port a ping check falls back to when the job names none
pub const DEFAULT_PING_PORT: i64 = 80;

async fn connect(address: &str, connect_timeout: Duration) -> io::Result<()> {
    let stream = timeout(connect_timeout, TcpStream::connect(address))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "TCP connection timeout"))??;
    drop(stream);
    Ok(())
}

/// Ping check: a TCP connect to the target, port 80 unless configured.
///
/// The dial time is reported whether or not the connect succeeds.
#[derive(Debug, Clone, Copy)]
pub struct PingChecker {
    connect_timeout: Duration,
}

impl PingChecker {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for PingChecker {
    fn default() -> Self {
        Self::new(CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Checker for PingChecker {
    async fn check(&self, job: &Monitoring) -> ProbeOutcome {
        let port = if job.port > 0 { job.port } else { DEFAULT_PING_PORT };
        let address = match address_for_port(&job.target, port) {
            Ok(address) => address,
            Err(e) => {
                debug!(monitoring_id = %job.id, "Invalid ping target: {}", e);
                return ProbeOutcome::down();
            }
        };

        let start = Instant::now();
        let result = connect(&address, self.connect_timeout).await;
        let elapsed = start.elapsed();

        match result {
            Ok(()) => ProbeOutcome::up(elapsed),
            Err(e) => {
                debug!(monitoring_id = %job.id, %address, "Ping failed: {}", e);
                ProbeOutcome::down_after(elapsed)
            }
        }
    }
}

/// Port check: a TCP connect to the job's explicit port.
///
/// A failed connect reports no response time.
#[derive(Debug, Clone, Copy)]
pub struct PortChecker {
    connect_timeout: Duration,
}

impl PortChecker {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for PortChecker {
    fn default() -> Self {
        Self::new(CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Checker for PortChecker {
    async fn check(&self, job: &Monitoring) -> ProbeOutcome {
        if job.port <= 0 {
            return ProbeOutcome::down();
        }

        let address = match address_for_port(&job.target, job.port) {
            Ok(address) => address,
            Err(e) => {
                debug!(monitoring_id = %job.id, "Invalid port target: {}", e);
                return ProbeOutcome::down();
            }
        };

        let start = Instant::now();
        match connect(&address, self.connect_timeout).await {
            Ok(()) => ProbeOutcome::up(start.elapsed()),
            Err(e) => {
                debug!(monitoring_id = %job.id, %address, "Port check failed: {}", e);
                ProbeOutcome::down()
            }
        }
    }
}
