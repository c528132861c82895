//! Top-level orchestration of one synchronization run.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::client::ClientFactory;
use crate::config::{
    ConfigStore, RemoteSettings, RequestTimeouts, SettingsOverrides, SyncSettings,
};
use crate::error::{ConfigError, Result};
use crate::export::{FailureRecord, SectionExporter, SectionReport, SectionStatus};
use crate::gitops::{PublishOutcome, RemotePublisher};
use crate::planner::DirectoryPlanner;
use crate::storage::{FileStore, OutputLayout};

/// Format of the `time.txt` marker, local time with microseconds.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// What happened to the publish step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishReport {
    Disabled,
    Published(PublishOutcome),
    Failed(FailureRecord),
}

/// Everything a run did, section by section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub timestamp: String,
    pub sections: Vec<SectionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_error: Option<FailureRecord>,
    pub publish: PublishReport,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.sections.iter().all(SectionReport::is_success)
            && self.marker_error.is_none()
            && !matches!(self.publish, PublishReport::Failed(_))
    }

    /// 0 when everything succeeded, 2 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            2
        }
    }
}

/// Drives layout creation, every section's export, the marker and publishing.
pub struct SyncRunner {
    settings: SyncSettings,
    overrides: SettingsOverrides,
    factory: Arc<dyn ClientFactory>,
}

impl SyncRunner {
    pub fn new(settings: SyncSettings, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            settings,
            overrides: SettingsOverrides::default(),
            factory,
        }
    }

    /// Values that win over the base file's `[export]` block.
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Runs once. Only configuration errors abort; every other failure
    /// ends up in the returned report.
    pub async fn run(&self) -> Result<SyncReport> {
        let sections = ConfigStore::open(&self.settings.sections_file)?;
        let base = self.load_base()?;

        let timeouts = RequestTimeouts::from_store(&base)?;
        let remote = RemoteSettings::from_store(&base)?;
        let mut settings = self.settings.clone();
        settings.apply_export_block(&base)?;
        self.overrides.apply(&mut settings);

        info!(
            sections = sections.sections().len(),
            layout = %settings.layout,
            concurrency = settings.concurrency,
            base_dir = %settings.base_dir.display(),
            "Starting synchronization"
        );

        let layout = OutputLayout::new(&settings.base_dir, settings.layout);
        let planned = DirectoryPlanner::new(layout.clone()).ensure_layout(&sections);

        let mut reports = Vec::new();
        for section in sections.sections() {
            let span = info_span!("section", name = %section);
            let report = if let Some(failure) =
                planned.failed.iter().find(|f| f.section == section)
            {
                SectionReport::skipped(&section, FailureRecord::new("IoError", failure.error.to_string()))
            } else {
                self.export_section(&section, &sections, timeouts, layout.clone(), settings.concurrency)
                    .instrument(span)
                    .await
            };
            reports.push(report);
        }

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let marker_error = match FileStore::new().write_text(&layout.timestamp_path(), &timestamp) {
            Ok(()) => None,
            Err(e) => {
                warn!(kind = "IoError", error = %e, "Failed to write timestamp marker");
                Some(FailureRecord::new("IoError", e.to_string()))
            }
        };

        let publish = if settings.publish {
            match RemotePublisher::new(&settings.repo_dir, remote).publish().await {
                Ok(outcome) => PublishReport::Published(outcome),
                Err(e) => {
                    warn!(kind = e.kind(), error = %e, "Failed to publish backup");
                    PublishReport::Failed(
                        FailureRecord::new(e.kind(), e.to_string())
                            .with_retryable(e.is_retryable()),
                    )
                }
            }
        } else {
            info!("Publishing disabled");
            PublishReport::Disabled
        };

        Ok(SyncReport {
            timestamp,
            sections: reports,
            marker_error,
            publish,
        })
    }

    fn load_base(&self) -> std::result::Result<ConfigStore, ConfigError> {
        match ConfigStore::open(&self.settings.base_file) {
            Ok(store) => Ok(store),
            Err(ConfigError::ConfigMissing { path }) => {
                warn!(path = %path.display(), "Base settings file not found, using defaults");
                Ok(ConfigStore::empty(path))
            }
            Err(e) => Err(e),
        }
    }

    async fn export_section(
        &self,
        section: &str,
        sections: &ConfigStore,
        timeouts: RequestTimeouts,
        layout: OutputLayout,
        concurrency: usize,
    ) -> SectionReport {
        let exporter = match SectionExporter::connect(
            section,
            sections,
            timeouts,
            self.factory.as_ref(),
            layout,
            concurrency,
        ) {
            Ok(exporter) => exporter,
            Err(reason) => {
                let record = FailureRecord::from(&reason);
                warn!(kind = %record.kind, error = %record.message, "Skipping section");
                return SectionReport::skipped(section, record);
            }
        };

        let export = exporter.export_all().await;

        log_payload("datasources", export.datasources.value.as_ref());
        if let Some(dashboards) = &export.dashboards.value {
            debug!(count = dashboards.len(), dashboards = ?dashboards, "Dashboards");
        }
        log_payload("alerts", export.alerts.value.as_ref());

        let report = SectionReport::from_export(section, &export);
        match report.status {
            SectionStatus::Succeeded => info!("Section exported"),
            status => warn!(status = ?status, "Section exported with failures"),
        }
        report
    }
}

fn log_payload(what: &str, value: Option<&Value>) {
    match value {
        Some(value) => debug!(payload = %value, "{}", what),
        None => debug!("{}: none", what),
    }
}
