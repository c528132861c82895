//! Per-section export of data sources, dashboards and alerts.

pub mod exporter;
pub mod report;

pub use exporter::{SectionExporter, SkipReason};
pub use report::{
    item_count, FailureRecord, SectionExport, SectionReport, SectionStatus, StepOutcome,
    StepReport, StepStatus,
};
