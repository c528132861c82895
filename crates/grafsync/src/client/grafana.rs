//! reqwest-backed client for the Grafana HTTP API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::api::{ClientFactory, MonitoringApi};
use super::error::{classify_request_error, ApiError};
use super::types::{DashboardSummary, FolderDescriptor};
use crate::config::{Credentials, RequestTimeouts};

/// Client bound to one section's host, folder and token.
pub struct GrafanaClient {
    client: Client,
    base_url: String,
    folder_uid: String,
}

impl GrafanaClient {
    /// Creates a client with the JSON/bearer headers and both timeouts preset.
    pub fn new(credentials: &Credentials, timeouts: RequestTimeouts) -> Result<Self, ApiError> {
        let client = Client::builder()
            .default_headers(default_headers(&credentials.key)?)
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: format!("http://{}:{}/api", credentials.host, credentials.port),
            folder_uid: credentials.uid.clone(),
        })
    }

    /// Full URL of an API path, e.g. `datasources` →
    /// `http://{host}:{port}/api/datasources`.
    pub fn query(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.query(path);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify_request_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpError {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_request_error(&url, e))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse {
            url,
            message: e.to_string(),
        })
    }
}

fn default_headers(key: &str) -> Result<HeaderMap, ApiError> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|_| ApiError::ClientBuild("API key contains invalid header characters".to_string()))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}

#[async_trait]
impl MonitoringApi for GrafanaClient {
    async fn folder(&self) -> Result<FolderDescriptor, ApiError> {
        self.get_json(&format!("folders/{}", self.folder_uid)).await
    }

    async fn list_dashboards(&self, folder_id: i64) -> Result<Vec<DashboardSummary>, ApiError> {
        self.get_json(&format!("search?folderIds={folder_id}")).await
    }

    async fn dashboard(&self, uid: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("dashboards/uid/{uid}")).await
    }

    async fn datasources(&self) -> Result<Value, ApiError> {
        self.get_json("datasources").await
    }

    async fn alerts(&self) -> Result<Value, ApiError> {
        self.get_json("alerts").await
    }
}

/// Production [`ClientFactory`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GrafanaClientFactory;

impl ClientFactory for GrafanaClientFactory {
    fn build(
        &self,
        credentials: &Credentials,
        timeouts: RequestTimeouts,
    ) -> Result<Arc<dyn MonitoringApi>, ApiError> {
        Ok(Arc::new(GrafanaClient::new(credentials, timeouts)?))
    }
}
