//! reqwest-backed implementation of [`CoreApi`].

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use tracing::debug;

use super::CoreApi;
use crate::config::Config;
use crate::error::CoreError;
use crate::monitor::{MonitorType, Monitoring, MonitoringResponsePayload, SslResultPayload};

const MONITORINGS_PATH: &str = "/api/v1/internal/monitorings";
const MONITORING_RESPONSES_PATH: &str = "/api/v1/internal/monitoring-responses";
const SSL_RESULTS_PATH: &str = "/api/v1/internal/ssl-results";

const API_KEY_HEADER: &str = "X-API-KEY";
const INSTANCE_CODE_HEADER: &str = "X-INSTANCE-CODE";

/// Overall timeout for a single Core API round trip
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Core internal API.
///
/// Cheap to share: the underlying reqwest client pools connections and is safe
/// for concurrent use by every worker.
#[derive(Debug, Clone)]
pub struct CoreClient {
    base_url: String,
    api_key: String,
    instance_code: String,
    http: reqwest::Client,
}

impl CoreClient {
    /// Create a client for the given Core base URL, API key and instance code
    pub fn new(
        base_url: impl AsRef<str>,
        api_key: impl AsRef<str>,
        instance_code: impl AsRef<str>,
    ) -> Result<Self, CoreError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_http_client(base_url, api_key, instance_code, http))
    }

    /// Create a client from the instance configuration
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        Self::new(&config.core_api_url, &config.core_api_key, &config.location)
    }

    /// Create a client around an existing reqwest client
    pub fn with_http_client(
        base_url: impl AsRef<str>,
        api_key: impl AsRef<str>,
        instance_code: impl AsRef<str>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.as_ref().trim().trim_end_matches('/').to_string(),
            api_key: api_key.as_ref().trim().to_string(),
            instance_code: instance_code.as_ref().trim().to_string(),
            http,
        }
    }

    fn ensure_configured(&self) -> Result<(), CoreError> {
        if self.base_url.is_empty() {
            return Err(CoreError::Configuration("WEBGUARD_CORE_API_URL is empty".to_string()));
        }
        if self.api_key.is_empty() {
            return Err(CoreError::Configuration("WEBGUARD_CORE_API_KEY is empty".to_string()));
        }
        if self.instance_code.is_empty() {
            return Err(CoreError::Configuration("WEBGUARD_LOCATION is empty".to_string()));
        }
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .header(INSTANCE_CODE_HEADER, &self.instance_code)
    }

    /// One round trip for one optional type filter
    async fn fetch_page(
        &self,
        location: &str,
        monitor_type: Option<&MonitorType>,
    ) -> Result<Vec<Monitoring>, CoreError> {
        let mut query = vec![("location", location)];
        if let Some(monitor_type) = monitor_type {
            query.push(("type", monitor_type.as_str()));
        }

        let request = self.request(Method::GET, MONITORINGS_PATH).query(&query);
        let raw = send(request).await?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let monitorings: Vec<Monitoring> = serde_json::from_str(&raw)?;
        debug!(
            location,
            monitor_type = monitor_type.map(MonitorType::as_str),
            count = monitorings.len(),
            "Fetched monitorings"
        );
        Ok(monitorings)
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, payload: &T) -> Result<(), CoreError> {
        self.ensure_configured()?;
        let request = self
            .request(Method::POST, path)
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(payload)?);
        send(request).await.map(|_| ())
    }
}

/// Send a request and read its body, turning error-class statuses into
/// [`CoreError::Status`].
async fn send(request: RequestBuilder) -> Result<String, CoreError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if status.as_u16() >= 400 {
        return Err(CoreError::Status { code: status.as_u16(), body });
    }
    Ok(body)
}

#[async_trait]
impl CoreApi for CoreClient {
    async fn fetch_jobs(
        &self,
        location: &str,
        types: &[MonitorType],
    ) -> Result<Vec<Monitoring>, CoreError> {
        self.ensure_configured()?;

        let location = location.trim();
        if location.is_empty() {
            return Err(CoreError::Configuration("WEBGUARD_LOCATION is empty".to_string()));
        }
        if location != self.instance_code {
            return Err(CoreError::Configuration(
                "location must match instance code".to_string(),
            ));
        }

        if types.is_empty() {
            return self.fetch_page(location, None).await;
        }

        let mut seen_types = HashSet::with_capacity(types.len());
        let mut seen_ids = HashSet::new();
        let mut monitorings = Vec::new();

        for monitor_type in types {
            if !seen_types.insert(monitor_type) {
                continue;
            }

            for monitoring in self.fetch_page(location, Some(monitor_type)).await? {
                if seen_ids.insert(monitoring.id.clone()) {
                    monitorings.push(monitoring);
                }
            }
        }

        Ok(monitorings)
    }

    async fn post_response_result(
        &self,
        payload: &MonitoringResponsePayload,
    ) -> Result<(), CoreError> {
        self.post(MONITORING_RESPONSES_PATH, payload).await
    }

    async fn post_ssl_result(&self, payload: &SslResultPayload) -> Result<(), CoreError> {
        self.post(SSL_RESULTS_PATH, payload).await
    }
}
