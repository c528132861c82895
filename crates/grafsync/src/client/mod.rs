//! Monitoring server API access.

pub mod api;
pub mod error;
pub mod grafana;
pub mod types;

pub use api::{ClientFactory, MonitoringApi};
pub use error::ApiError;
pub use grafana::{GrafanaClient, GrafanaClientFactory};
pub use types::{DashboardSummary, FolderDescriptor};
