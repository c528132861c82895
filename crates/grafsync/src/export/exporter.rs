use std::collections::HashSet;
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::{ApiError, ClientFactory, DashboardSummary, MonitoringApi};
use crate::config::{ConfigStore, Credentials, RequestTimeouts};
use crate::error::{ConfigError, ExportError};
use crate::storage::{FileStore, OutputLayout};

use super::report::{FailureRecord, SectionExport, StepOutcome};

/// Why a section could not be exported at all.
#[derive(Error, Debug)]
pub enum SkipReason {
    #[error(transparent)]
    Credentials(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ApiError),
}

impl From<&SkipReason> for FailureRecord {
    fn from(reason: &SkipReason) -> Self {
        let (kind, retryable) = match reason {
            SkipReason::Credentials(e) => (e.kind(), false),
            SkipReason::Client(e) => (e.kind(), e.is_retryable()),
        };
        FailureRecord::new(kind, reason.to_string()).with_retryable(retryable)
    }
}

/// Exports data sources, dashboards and alerts of one section.
pub struct SectionExporter {
    section: String,
    api: Arc<dyn MonitoringApi>,
    layout: OutputLayout,
    store: FileStore,
    concurrency: usize,
}

impl SectionExporter {
    pub fn new(
        section: impl Into<String>,
        api: Arc<dyn MonitoringApi>,
        layout: OutputLayout,
        concurrency: usize,
    ) -> Self {
        Self {
            section: section.into(),
            api,
            layout,
            store: FileStore::new(),
            concurrency: concurrency.max(1),
        }
    }

    /// Resolves the section's credentials and builds its client.
    ///
    /// Incomplete credentials never produce a client.
    pub fn connect(
        section: &str,
        sections: &ConfigStore,
        timeouts: RequestTimeouts,
        factory: &dyn ClientFactory,
        layout: OutputLayout,
        concurrency: usize,
    ) -> Result<Self, SkipReason> {
        let credentials = Credentials::resolve(sections, section)?;
        debug!(section = %section, credentials = ?credentials, "Resolved credentials");
        let api = factory.build(&credentials, timeouts)?;
        Ok(Self::new(section, api, layout, concurrency))
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// Runs the three independent steps concurrently.
    pub async fn export_all(&self) -> SectionExport {
        let (datasources, dashboards, alerts) = tokio::join!(
            self.export_datasources(),
            self.export_dashboards(),
            self.export_alerts()
        );
        SectionExport {
            datasources,
            dashboards,
            alerts,
        }
    }

    /// Fetches data sources and writes them. The fetched value is returned
    /// even when the write fails.
    pub async fn export_datasources(&self) -> StepOutcome<Value> {
        let path = self.layout.datasource_path(&self.section);
        self.export_payload("data sources", self.api.datasources().await, path)
    }

    /// Fetches alerts and writes them.
    pub async fn export_alerts(&self) -> StepOutcome<Value> {
        let path = self.layout.alerts_path(&self.section);
        self.export_payload("alerts", self.api.alerts().await, path)
    }

    /// Folder, then dashboard search, then every dashboard body.
    ///
    /// A failed folder or search request ends the step without any further
    /// request. Bodies are fetched concurrently but written in list order, so
    /// of two titles mapping to the same file the later entry wins. Failures
    /// of single dashboards are collected and do not stop the others.
    pub async fn export_dashboards(&self) -> StepOutcome<Vec<DashboardSummary>> {
        let folder = match self.api.folder().await {
            Ok(folder) => folder,
            Err(e) => {
                self.report_failure("folder", &e);
                return StepOutcome::failed(e);
            }
        };
        debug!(section = %self.section, folder_id = folder.id, "Fetched folder");

        let summaries = match self.api.list_dashboards(folder.id).await {
            Ok(summaries) => summaries,
            Err(e) => {
                self.report_failure("dashboard list", &e);
                return StepOutcome::failed(e);
            }
        };

        self.warn_on_colliding_titles(&summaries);

        let failures = self.fetch_and_write(&summaries).await;

        info!(
            section = %self.section,
            total = summaries.len(),
            failed = failures.len(),
            "Exported dashboards"
        );

        StepOutcome {
            value: Some(summaries),
            failures,
        }
    }

    /// Fetches `concurrency` bodies at a time; `buffered` yields them in list
    /// order, so writes happen in list order too.
    async fn fetch_and_write(&self, summaries: &[DashboardSummary]) -> Vec<ExportError> {
        let mut fetched = pin!(stream::iter(summaries)
            .map(|summary| async move { (summary, self.fetch_dashboard(summary).await) })
            .buffered(self.concurrency));

        let mut failures = Vec::new();
        while let Some((summary, result)) = fetched.next().await {
            if let Err(e) = result.and_then(|body| self.write_dashboard(summary, &body)) {
                failures.push(e);
            }
        }
        failures
    }

    async fn fetch_dashboard(&self, summary: &DashboardSummary) -> Result<Value, ExportError> {
        self.api.dashboard(&summary.uid).await.map_err(|e| {
            self.report_failure(&format!("dashboard '{}'", summary.title), &e);
            ExportError::from(e)
        })
    }

    fn write_dashboard(&self, summary: &DashboardSummary, body: &Value) -> Result<PathBuf, ExportError> {
        let path = self.layout.dashboard_path(&self.section, &summary.title);
        self.store.write_json(&path, body).map_err(|e| {
            warn!(section = %self.section, kind = "IoError", error = %e, "Failed to write dashboard");
            ExportError::from(e)
        })?;

        debug!(section = %self.section, uid = %summary.uid, path = %path.display(), "Wrote dashboard");
        Ok(path)
    }

    fn export_payload(
        &self,
        what: &str,
        fetched: Result<Value, ApiError>,
        path: PathBuf,
    ) -> StepOutcome<Value> {
        let value = match fetched {
            Ok(value) => value,
            Err(e) => {
                self.report_failure(what, &e);
                return StepOutcome::failed(e);
            }
        };

        let mut outcome = StepOutcome::succeeded(value);
        if let Some(value) = &outcome.value {
            match self.store.write_json(&path, value) {
                Ok(()) => {
                    debug!(section = %self.section, path = %path.display(), "Wrote {}", what);
                }
                Err(e) => {
                    warn!(section = %self.section, kind = "IoError", error = %e, "Failed to write {}", what);
                    outcome.failures.push(e.into());
                }
            }
        }
        outcome
    }

    fn report_failure(&self, what: &str, error: &ApiError) {
        warn!(
            section = %self.section,
            kind = error.kind(),
            error = %error,
            "Failed to fetch {}",
            what
        );
    }

    fn warn_on_colliding_titles(&self, summaries: &[DashboardSummary]) {
        let mut seen = HashSet::new();
        for summary in summaries {
            let path = self.layout.dashboard_path(&self.section, &summary.title);
            if !seen.insert(path.clone()) {
                warn!(
                    section = %self.section,
                    uid = %summary.uid,
                    path = %path.display(),
                    "Dashboard title collides with an earlier dashboard, the later one is kept"
                );
            }
        }
    }
}
