//! Typed settings resolved from the two INI files.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use super::store::{ConfigStore, TIMEOUTS_SECTION};
use crate::error::ConfigError;

/// Default port of the monitoring server API.
pub const DEFAULT_API_PORT: u16 = 3000;

/// Default number of dashboards fetched in parallel within a section.
pub const DEFAULT_CONCURRENCY: usize = 4;

const REMOTE_SECTION: &str = "bitbucket";
const EXPORT_SECTION: &str = "export";

/// Per-section API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Folder uid on the server.
    pub uid: String,
    /// Server host name or address.
    pub host: String,
    /// Bearer token.
    pub key: String,
    /// API port, `port` key in the section or 3000.
    pub port: u16,
}

impl Credentials {
    /// Resolves the credentials of `section`.
    ///
    /// Every missing or blank field is collected so the error names all of
    /// them at once.
    pub fn resolve(store: &ConfigStore, section: &str) -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut field = |key: &str| match store.get(section, key) {
            Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => {
                missing.push(key.to_string());
                String::new()
            }
        };

        let uid = field("uid");
        let host = field("host");
        let key = field("key");

        if !missing.is_empty() {
            return Err(ConfigError::IncompleteCredentials {
                section: section.to_string(),
                missing,
            });
        }

        let port = match store.get_optional(section, "port") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                section: section.to_string(),
                key: "port".to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_API_PORT,
        };

        Ok(Self {
            uid,
            host,
            key,
            port,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("uid", &self.uid)
            .field("host", &self.host)
            .field("key", &"****")
            .field("port", &self.port)
            .finish()
    }
}

/// Connect-phase and read-phase timeouts applied to every API request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(50),
            read: Duration::from_secs(10),
        }
    }
}

impl RequestTimeouts {
    pub fn from_store(store: &ConfigStore) -> Result<Self, ConfigError> {
        Ok(Self {
            connect: parse_seconds(store, TIMEOUTS_SECTION, "connect")?,
            read: parse_seconds(store, TIMEOUTS_SECTION, "read")?,
        })
    }
}

fn parse_seconds(store: &ConfigStore, section: &str, key: &str) -> Result<Duration, ConfigError> {
    let raw = store.get(section, key)?;
    let invalid = |reason: &str| ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: raw.clone(),
        reason: reason.to_string(),
    };

    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("expected a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid("must be a positive, finite number of seconds"));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Where data source and alert exports land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactLayout {
    /// `<base>/datasource/<section>/datasource.json`, one file per section.
    #[default]
    PerSection,
    /// `<base>/datasource/datasource.json`, overwritten by every section.
    Shared,
}

impl FromStr for ArtifactLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-section" | "per_section" | "section" => Ok(ArtifactLayout::PerSection),
            "shared" => Ok(ArtifactLayout::Shared),
            other => Err(format!(
                "unknown layout '{other}', expected 'per-section' or 'shared'"
            )),
        }
    }
}

impl fmt::Display for ArtifactLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactLayout::PerSection => f.write_str("per-section"),
            ArtifactLayout::Shared => f.write_str("shared"),
        }
    }
}

/// Settings of the `[bitbucket]` block.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSettings {
    /// Remote repository URL. When set, the remote is pointed at it before pushing.
    pub url: Option<String>,
    pub remote: String,
    pub branch: String,
    pub message: String,
    /// Stage new files too instead of only tracked ones.
    pub stage_untracked: bool,
    pub push_timeout: Duration,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            url: None,
            remote: "origin".to_string(),
            branch: "master".to_string(),
            message: "Auto commit".to_string(),
            stage_untracked: false,
            push_timeout: Duration::from_secs(120),
        }
    }
}

impl RemoteSettings {
    pub fn from_store(store: &ConfigStore) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let text = |key: &str| {
            store
                .get_optional(REMOTE_SECTION, key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let stage_untracked = match text("stage_untracked") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                section: REMOTE_SECTION.to_string(),
                key: "stage_untracked".to_string(),
                value: raw.clone(),
                reason: "expected true or false".to_string(),
            })?,
            None => defaults.stage_untracked,
        };

        let push_timeout = if text("push_timeout").is_some() {
            parse_seconds(store, REMOTE_SECTION, "push_timeout")?
        } else {
            defaults.push_timeout
        };

        Ok(Self {
            url: text("host"),
            remote: text("remote").unwrap_or(defaults.remote),
            branch: text("branch").unwrap_or(defaults.branch),
            message: text("message").unwrap_or(defaults.message),
            stage_untracked,
            push_timeout,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Explicit run configuration handed to every component.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Base data directory; every output path is relative to it.
    pub base_dir: PathBuf,
    /// File listing one block per section.
    pub sections_file: PathBuf,
    /// File with `[requests]`, `[bitbucket]` and `[export]`.
    pub base_file: PathBuf,
    /// Directory inside the git work tree to publish from.
    pub repo_dir: PathBuf,
    pub layout: ArtifactLayout,
    /// Dashboards fetched in parallel per section.
    pub concurrency: usize,
    /// Commit and push after exporting.
    pub publish: bool,
}

impl SyncSettings {
    /// Defaults rooted at `base_dir`: `ini/grafana.ini`, `ini/base.ini`.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        Self {
            sections_file: base_dir.join("ini").join("grafana.ini"),
            base_file: base_dir.join("ini").join("base.ini"),
            repo_dir: base_dir.clone(),
            base_dir,
            layout: ArtifactLayout::default(),
            concurrency: DEFAULT_CONCURRENCY,
            publish: true,
        }
    }

    /// Applies the optional `[export]` block of the base file.
    pub fn apply_export_block(&mut self, store: &ConfigStore) -> Result<(), ConfigError> {
        if let Some(raw) = store.get_optional(EXPORT_SECTION, "layout") {
            self.layout = raw.parse().map_err(|reason| ConfigError::InvalidValue {
                section: EXPORT_SECTION.to_string(),
                key: "layout".to_string(),
                value: raw.clone(),
                reason,
            })?;
        }

        if let Some(raw) = store.get_optional(EXPORT_SECTION, "concurrency") {
            self.concurrency = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    section: EXPORT_SECTION.to_string(),
                    key: "concurrency".to_string(),
                    value: raw.clone(),
                    reason: "expected a positive integer".to_string(),
                })?;
        }

        Ok(())
    }
}

/// Command-line values that win over the `[export]` block.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub layout: Option<ArtifactLayout>,
    pub concurrency: Option<usize>,
}

impl SettingsOverrides {
    pub fn apply(&self, settings: &mut SyncSettings) {
        if let Some(layout) = self.layout {
            settings.layout = layout;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency.max(1);
        }
    }
}
