//! Creates the per-section directory skeleton before any export runs.

use tracing::{debug, warn};

use crate::config::ConfigStore;
use crate::error::StorageError;
use crate::storage::OutputLayout;

/// A section whose directories could not be created.
#[derive(Debug)]
pub struct LayoutFailure {
    pub section: String,
    pub error: StorageError,
}

/// Outcome of [`DirectoryPlanner::ensure_layout`].
#[derive(Debug, Default)]
pub struct LayoutReport {
    /// Sections whose directories exist after the call.
    pub ready: Vec<String>,
    pub failed: Vec<LayoutFailure>,
}

pub struct DirectoryPlanner {
    layout: OutputLayout,
}

impl DirectoryPlanner {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }

    /// Ensures every section of `sections` has its output directories.
    ///
    /// Idempotent: existing directories count as success. A failure only
    /// affects the section it occurred in.
    pub fn ensure_layout(&self, sections: &ConfigStore) -> LayoutReport {
        let mut report = LayoutReport::default();

        for section in sections.sections() {
            match self.ensure_section(&section) {
                Ok(()) => report.ready.push(section),
                Err(error) => {
                    warn!(section = %section, error = %error, "Skipping directory layout for section");
                    report.failed.push(LayoutFailure { section, error });
                }
            }
        }

        report
    }

    fn ensure_section(&self, section: &str) -> Result<(), StorageError> {
        for dir in self.layout.section_dirs(section) {
            if dir.is_dir() {
                debug!(path = %dir.display(), "Directory already exists");
                continue;
            }
            std::fs::create_dir_all(&dir).map_err(|e| StorageError::CreateDirectory {
                path: dir.clone(),
                source: e,
            })?;
            debug!(path = %dir.display(), "Created directory");
        }
        Ok(())
    }
}
