use serde::Serialize;
use serde_json::Value;

use crate::client::DashboardSummary;
use crate::error::ExportError;

/// Status of one export step or one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Partial,
    Failed,
}

/// Fetched value of a step plus everything that went wrong on the way.
///
/// `value` is `None` when the fetch itself failed; a value with failures
/// means the fetch worked but some writes (or single dashboards) did not.
#[derive(Debug)]
pub struct StepOutcome<T> {
    pub value: Option<T>,
    pub failures: Vec<ExportError>,
}

impl<T> StepOutcome<T> {
    pub fn succeeded(value: T) -> Self {
        Self {
            value: Some(value),
            failures: Vec::new(),
        }
    }

    pub fn failed(error: impl Into<ExportError>) -> Self {
        Self {
            value: None,
            failures: vec![error.into()],
        }
    }

    pub fn status(&self) -> StepStatus {
        match (&self.value, self.failures.is_empty()) {
            (None, _) => StepStatus::Failed,
            (Some(_), true) => StepStatus::Succeeded,
            (Some(_), false) => StepStatus::Partial,
        }
    }
}

/// Serializable record of a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub kind: String,
    pub message: String,
    /// The next scheduled run is likely to succeed without intervention.
    pub retryable: bool,
}

impl FailureRecord {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            retryable: false,
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

impl From<&ExportError> for FailureRecord {
    fn from(err: &ExportError) -> Self {
        Self::new(err.kind(), err.to_string()).with_retryable(err.is_retryable())
    }
}

/// Serializable summary of a [`StepOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub status: StepStatus,
    /// Number of items in the fetched value, if any was fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureRecord>,
}

impl StepReport {
    fn from_outcome<T>(outcome: &StepOutcome<T>, count: impl Fn(&T) -> usize) -> Self {
        Self {
            status: outcome.status(),
            items: outcome.value.as_ref().map(count),
            failures: outcome.failures.iter().map(FailureRecord::from).collect(),
        }
    }
}

/// Number of entries in an opaque payload: array length, 0 for null, else 1.
pub fn item_count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Null => 0,
        _ => 1,
    }
}

/// Results of the three export steps of one section.
#[derive(Debug)]
pub struct SectionExport {
    pub datasources: StepOutcome<Value>,
    pub dashboards: StepOutcome<Vec<DashboardSummary>>,
    pub alerts: StepOutcome<Value>,
}

/// Aggregate status of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Succeeded,
    Partial,
    Failed,
    /// Nothing was attempted: credentials, client or directories missing.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub section: String,
    pub status: SectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<FailureRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasources: Option<StepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboards: Option<StepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerts: Option<StepReport>,
}

impl SectionReport {
    pub fn skipped(section: impl Into<String>, reason: FailureRecord) -> Self {
        Self {
            section: section.into(),
            status: SectionStatus::Skipped,
            skip_reason: Some(reason),
            datasources: None,
            dashboards: None,
            alerts: None,
        }
    }

    pub fn from_export(section: impl Into<String>, export: &SectionExport) -> Self {
        let datasources = StepReport::from_outcome(&export.datasources, item_count);
        let dashboards = StepReport::from_outcome(&export.dashboards, Vec::len);
        let alerts = StepReport::from_outcome(&export.alerts, item_count);

        let statuses = [datasources.status, dashboards.status, alerts.status];
        let status = if statuses.iter().all(|s| *s == StepStatus::Succeeded) {
            SectionStatus::Succeeded
        } else if statuses.iter().all(|s| *s == StepStatus::Failed) {
            SectionStatus::Failed
        } else {
            SectionStatus::Partial
        };

        Self {
            section: section.into(),
            status,
            skip_reason: None,
            datasources: Some(datasources),
            dashboards: Some(dashboards),
            alerts: Some(alerts),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SectionStatus::Succeeded
    }
}
