//! Deterministic output paths below the base data directory.

use std::path::{Path, PathBuf};

use crate::config::ArtifactLayout;
use crate::sanitize::sanitize_title;

const DOCS_DIR: &str = "docs";
const DASHBOARDS_DIR: &str = "dashboards";
const DATASOURCE_DIR: &str = "datasource";
const DATASOURCE_FILE: &str = "datasource.json";
const ALERTS_DIR: &str = "alerts";
const ALERTS_FILE: &str = "alerts.json";
const TIMESTAMP_FILE: &str = "time.txt";

/// Maps `(section, artifact, title)` to a path under `base_dir`.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    base_dir: PathBuf,
    layout: ArtifactLayout,
}

impl OutputLayout {
    pub fn new<P: AsRef<Path>>(base_dir: P, layout: ArtifactLayout) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            layout,
        }
    }

    /// `<base>/docs/<section>/dashboards`
    pub fn dashboards_dir(&self, section: &str) -> PathBuf {
        self.base_dir.join(DOCS_DIR).join(section).join(DASHBOARDS_DIR)
    }

    /// `<base>/docs/<section>/dashboards/<title>.json`, title sanitized.
    pub fn dashboard_path(&self, section: &str, title: &str) -> PathBuf {
        self.dashboards_dir(section)
            .join(format!("{}.json", sanitize_title(title)))
    }

    pub fn datasource_dir(&self, section: &str) -> PathBuf {
        self.artifact_dir(DATASOURCE_DIR, section)
    }

    pub fn datasource_path(&self, section: &str) -> PathBuf {
        self.datasource_dir(section).join(DATASOURCE_FILE)
    }

    pub fn alerts_dir(&self, section: &str) -> PathBuf {
        self.artifact_dir(ALERTS_DIR, section)
    }

    pub fn alerts_path(&self, section: &str) -> PathBuf {
        self.alerts_dir(section).join(ALERTS_FILE)
    }

    /// `<base>/time.txt`
    pub fn timestamp_path(&self) -> PathBuf {
        self.base_dir.join(TIMESTAMP_FILE)
    }

    /// Every directory a section writes into.
    pub fn section_dirs(&self, section: &str) -> Vec<PathBuf> {
        vec![
            self.dashboards_dir(section),
            self.datasource_dir(section),
            self.alerts_dir(section),
        ]
    }

    fn artifact_dir(&self, kind: &str, section: &str) -> PathBuf {
        match self.layout {
            ArtifactLayout::Shared => self.base_dir.join(kind),
            ArtifactLayout::PerSection => self.base_dir.join(kind).join(section),
        }
    }
}
