pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod gitops;
pub mod planner;
pub mod runner;
pub mod sanitize;
pub mod storage;

pub use client::{ApiError, ClientFactory, GrafanaClient, GrafanaClientFactory, MonitoringApi};
pub use config::{ArtifactLayout, ConfigStore, SettingsOverrides, SyncSettings};
pub use error::{ConfigError, ExportError, Result, StorageError, SyncError};
pub use export::{SectionExporter, SectionReport, SectionStatus};
pub use gitops::{GitOpsError, PublishOutcome, RemotePublisher};
pub use planner::DirectoryPlanner;
pub use runner::{PublishReport, SyncReport, SyncRunner};
