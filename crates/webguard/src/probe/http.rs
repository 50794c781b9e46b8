//! HTTP request execution shared by the http and keyword checks.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{Checker, ProbeOutcome};
use crate::error::ProbeError;
use crate::monitor::Monitoring;

/// Additional attempts after the first failed one
const RETRY_TIMES: u32 = 1;
const RETRY_DELAY: Duration = Duration::from_millis(250);
const MAX_REDIRECTS: usize = 5;

/// Body sent when a job's body is missing or cannot be parsed
const EMPTY_BODY: &[u8] = b"[]";

/// What came back from a probe request
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,

    /// Time from the first attempt until the response headers arrived
    pub elapsed: Duration,
}

/// Up when the target answers with a 2xx or 3xx status
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpChecker;

#[async_trait]
impl Checker for HttpChecker {
    async fn check(&self, job: &Monitoring) -> ProbeOutcome {
        match perform_request(job).await {
            Ok(reply) if (200..400).contains(&reply.status) => ProbeOutcome::up(reply.elapsed),
            Ok(reply) => {
                debug!(monitoring_id = %job.id, status = reply.status, "HTTP check failed");
                ProbeOutcome::down()
            }
            Err(e) => {
                debug!(monitoring_id = %job.id, "HTTP check failed: {}", e);
                ProbeOutcome::down()
            }
        }
    }
}

/// Up when the response body contains the job's keyword
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordChecker;

#[async_trait]
impl Checker for KeywordChecker {
    async fn check(&self, job: &Monitoring) -> ProbeOutcome {
        match perform_request(job).await {
            Ok(reply) if reply.body.contains(job.keyword.as_str()) => {
                ProbeOutcome::up(reply.elapsed)
            }
            Ok(_) => {
                debug!(monitoring_id = %job.id, "Keyword not found in response body");
                ProbeOutcome::down()
            }
            Err(e) => {
                debug!(monitoring_id = %job.id, "Keyword check failed: {}", e);
                ProbeOutcome::down()
            }
        }
    }
}

/// Build the client for one probe.
///
/// Certificate verification is off: probes report reachability, certificate
/// trust is judged separately by the SSL phase.
fn probe_client(timeout_seconds: i64) -> Result<reqwest::Client, ProbeError> {
    let mut builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));

    if timeout_seconds > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_seconds.unsigned_abs()));
    }

    builder.build().map_err(ProbeError::Client)
}

/// Perform the HTTP request described by `job`.
///
/// Transport failures and 5xx answers are retried once after a short delay.
/// Any other status is returned as-is for the calling check to judge.
pub async fn perform_request(job: &Monitoring) -> Result<HttpReply, ProbeError> {
    let target = job.target.trim();
    if target.is_empty() {
        return Err(ProbeError::EmptyTarget);
    }

    let method = job.http_method;
    let mut headers = normalize_headers(job.http_headers.as_ref());
    let body = method.allows_body().then(|| normalize_body(job.http_body.as_ref()));

    let has_content_type = headers.keys().any(|key| key.eq_ignore_ascii_case("content-type"));
    if body.as_ref().is_some_and(|body| !body.is_empty()) && !has_content_type {
        headers.insert("Content-Type".to_string(), "application/json".to_string());
    }

    let client = probe_client(job.timeout)?;
    let start = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;
        let retries_left = attempt <= RETRY_TIMES;

        let mut request = client.request(method.as_reqwest(), target);
        for (key, value) in &headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some((username, password)) = job.basic_auth() {
            request = request.basic_auth(username, Some(password));
        }
        if let Some(body) = &body {
            request = request.body(body.clone());
        }

        match request.send().await {
            Ok(response) if response.status().is_server_error() && retries_left => {
                debug!(
                    monitoring_id = %job.id,
                    status = response.status().as_u16(),
                    "Server error, retrying"
                );
            }
            Ok(response) => {
                let elapsed = start.elapsed();
                let status = response.status().as_u16();
                let bytes = response.bytes().await?;
                return Ok(HttpReply {
                    status,
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                    elapsed,
                });
            }
            // A request that cannot even be built will not get better
            Err(e) if e.is_builder() => return Err(e.into()),
            Err(e) if retries_left => {
                debug!(monitoring_id = %job.id, "Request failed, retrying: {}", e);
            }
            Err(e) => return Err(e.into()),
        }

        tokio::time::sleep(RETRY_DELAY).await;
    }
}

/// Flatten a header definition into name/value pairs.
///
/// Accepts a JSON object or a string holding one; anything else, including
/// invalid JSON, yields no headers.
pub fn normalize_headers(raw: Option<&Value>) -> BTreeMap<String, String> {
    let parsed;
    let object = match raw {
        Some(Value::Object(object)) => object,
        Some(Value::String(s)) if !s.trim().is_empty() => {
            parsed = serde_json::from_str::<Value>(s).ok();
            match &parsed {
                Some(Value::Object(object)) => object,
                _ => return BTreeMap::new(),
            }
        }
        _ => return BTreeMap::new(),
    };

    object
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Serialise a body definition to JSON bytes.
///
/// Strings are parsed as JSON and re-serialised; missing, blank or unparseable
/// bodies collapse to an empty JSON array.
pub fn normalize_body(raw: Option<&Value>) -> Vec<u8> {
    match raw {
        None | Some(Value::Null) => EMPTY_BODY.to_vec(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return EMPTY_BODY.to_vec();
            }
            serde_json::from_str::<Value>(trimmed)
                .and_then(|value| serde_json::to_vec(&value))
                .unwrap_or_else(|_| EMPTY_BODY.to_vec())
        }
        Some(other) => serde_json::to_vec(other).unwrap_or_else(|_| EMPTY_BODY.to_vec()),
    }
}
