//! Monitoring API trait definition

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::error::ApiError;
use super::types::{DashboardSummary, FolderDescriptor};
use crate::config::{Credentials, RequestTimeouts};

/// Read operations against one section's monitoring server.
///
/// Every method issues exactly one request. Bodies other than the folder
/// and the search result are returned untouched.
#[async_trait]
pub trait MonitoringApi: Send + Sync {
    /// `GET /api/folders/{uid}` for the section's folder.
    async fn folder(&self) -> Result<FolderDescriptor, ApiError>;

    /// `GET /api/search?folderIds={folder_id}`
    async fn list_dashboards(&self, folder_id: i64) -> Result<Vec<DashboardSummary>, ApiError>;

    /// `GET /api/dashboards/uid/{uid}`
    async fn dashboard(&self, uid: &str) -> Result<Value, ApiError>;

    /// `GET /api/datasources`
    async fn datasources(&self) -> Result<Value, ApiError>;

    /// `GET /api/alerts`
    async fn alerts(&self) -> Result<Value, ApiError>;
}

/// Builds a client for a section from its resolved credentials.
pub trait ClientFactory: Send + Sync {
    fn build(
        &self,
        credentials: &Credentials,
        timeouts: RequestTimeouts,
    ) -> Result<Arc<dyn MonitoringApi>, ApiError>;
}
