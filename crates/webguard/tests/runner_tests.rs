//! Run orchestration against an in-process Core

mod common;

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Barrier;
use webguard::{
    CancellationToken, Config, CoreApi, CoreError, MonitorType, Monitoring,
    MonitoringResponsePayload, ProbeExecutor, Runner, SslResultPayload, SslValidator, Status,
};

#[derive(Default)]
struct FakeCore {
    jobs: Vec<Monitoring>,
    fail_filtered: bool,
    rendezvous: Option<Barrier>,
    fetches: Mutex<Vec<Vec<MonitorType>>>,
    responses: Mutex<Vec<MonitoringResponsePayload>>,
    ssl_results: Mutex<Vec<SslResultPayload>>,
}

#[async_trait]
impl CoreApi for FakeCore {
    async fn fetch_jobs(
        &self,
        location: &str,
        types: &[MonitorType],
    ) -> Result<Vec<Monitoring>, CoreError> {
        assert_eq!(location, "eu-1");
        self.fetches.lock().unwrap().push(types.to_vec());

        if let Some(rendezvous) = &self.rendezvous {
            rendezvous.wait().await;
        }

        if self.fail_filtered && !types.is_empty() {
            return Err(CoreError::Status { code: 502, body: "bad gateway".to_string() });
        }

        Ok(self
            .jobs
            .iter()
            .filter(|job| types.is_empty() || types.contains(&job.monitor_type))
            .cloned()
            .collect())
    }

    async fn post_response_result(
        &self,
        payload: &MonitoringResponsePayload,
    ) -> Result<(), CoreError> {
        self.responses.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn post_ssl_result(&self, payload: &SslResultPayload) -> Result<(), CoreError> {
        self.ssl_results.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

fn runner(core: Arc<FakeCore>) -> Runner {
    let config = Config { location: "eu-1".to_string(), workers: 2, ..Config::default() };
    Runner::new(
        core,
        &config,
        Arc::new(ProbeExecutor::new()),
        Arc::new(SslValidator::new().unwrap()),
    )
}

/// Jobs that resolve without touching the network
fn offline_jobs() -> Vec<Monitoring> {
    let mut in_maintenance = Monitoring::new("1", MonitorType::Http, "https://example.com");
    in_maintenance.maintenance_active = true;

    vec![
        in_maintenance,
        Monitoring::new("2", MonitorType::Keyword, "   "),
        Monitoring::new("3", MonitorType::Ping, "   "),
        Monitoring::new("4", MonitorType::from("dns"), "example.com"),
    ]
}

fn sorted(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids
}

#[tokio::test]
async fn test_maintenance_posts_unknown_response_and_no_ssl_result() {
    common::init_tracing();
    let core = Arc::new(FakeCore { jobs: offline_jobs(), ..FakeCore::default() });

    let report = runner(core.clone()).run_once(&CancellationToken::new()).await;
    assert!(report.is_complete());

    let responses = core.responses.lock().unwrap();
    let maintenance = responses.iter().find(|payload| payload.monitoring_id == "1").unwrap();
    assert_eq!(*maintenance, MonitoringResponsePayload::maintenance("1"));

    let ssl_results = core.ssl_results.lock().unwrap();
    assert!(ssl_results.iter().all(|payload| payload.monitoring_id != "1"));

    let response = report.response.unwrap();
    assert_eq!(response.skipped_maintenance, 1);
    assert_eq!(response.dispatched, 3);
}

#[tokio::test]
async fn test_every_job_gets_one_result_per_phase() {
    let core = Arc::new(FakeCore { jobs: offline_jobs(), ..FakeCore::default() });

    runner(core.clone()).run_once(&CancellationToken::new()).await;

    let responses = core.responses.lock().unwrap();
    let ids = responses.iter().map(|p| p.monitoring_id.clone()).collect();
    assert_eq!(sorted(ids), ["1", "2", "3", "4"]);
    let status_of = |id: &str| responses.iter().find(|p| p.monitoring_id == id).unwrap().status;
    assert_eq!(status_of("2"), Status::Down);
    assert_eq!(status_of("3"), Status::Down);
    assert_eq!(status_of("4"), Status::Unknown);

    // Ping and unknown types never reach the SSL phase
    let ssl_results = core.ssl_results.lock().unwrap();
    let ids = ssl_results.iter().map(|p| p.monitoring_id.clone()).collect();
    assert_eq!(sorted(ids), ["2"]);
    assert!(!ssl_results[0].is_valid);
}

#[tokio::test]
async fn test_phases_fetch_with_expected_filters() {
    let core = Arc::new(FakeCore::default());

    runner(core.clone()).run_once(&CancellationToken::new()).await;

    let mut fetches = core.fetches.lock().unwrap().clone();
    fetches.sort_by_key(Vec::len);
    assert_eq!(
        fetches,
        vec![vec![], vec![MonitorType::Http, MonitorType::Keyword, MonitorType::Port]]
    );
}

#[tokio::test]
async fn test_phases_run_concurrently() {
    // Each fetch waits for the other one; sequential phases would never finish.
    let core = Arc::new(FakeCore { rendezvous: Some(Barrier::new(2)), ..FakeCore::default() });

    let runner = runner(core);
    let cancel = CancellationToken::new();
    let report = tokio::time::timeout(Duration::from_secs(5), runner.run_once(&cancel))
        .await
        .unwrap();
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_failed_phase_does_not_stop_sibling() {
    let core = Arc::new(FakeCore {
        jobs: offline_jobs(),
        fail_filtered: true,
        ..FakeCore::default()
    });

    let report = runner(core.clone()).run_once(&CancellationToken::new()).await;

    assert!(!report.is_complete());
    assert!(report.ssl.is_none());
    assert_eq!(report.response.map(|summary| summary.total), Some(4));
    assert_eq!(core.responses.lock().unwrap().len(), 4);
    assert!(core.ssl_results.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancelled_run_fetches_nothing() {
    let core = Arc::new(FakeCore { jobs: offline_jobs(), ..FakeCore::default() });
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = runner(core.clone()).run_once(&cancel).await;

    assert_eq!(report.response, None);
    assert_eq!(report.ssl, None);
    assert!(core.fetches.lock().unwrap().is_empty());
}

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[tokio::test]
async fn test_empty_batches_are_reported() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let core = Arc::new(FakeCore::default());
    let report = runner(core).run_once(&CancellationToken::new()).await;

    assert_eq!(report.response.map(|summary| summary.total), Some(0));
    assert_eq!(report.ssl.map(|summary| summary.total), Some(0));

    let output = logs.contents();
    assert!(output.contains("No active response monitoring found."));
    assert!(output.contains("No active SSL monitoring found."));
}
