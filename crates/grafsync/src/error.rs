use std::path::PathBuf;
use thiserror::Error;

use crate::client::ApiError;

/// Errors that abort a whole run before any section is exported.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    ConfigMissing { path: PathBuf },

    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Key '{key}' not found in section [{section}]")]
    KeyNotFound { section: String, key: String },

    #[error("Invalid value '{value}' for [{section}] {key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Incomplete credentials for section [{section}]: missing {}", missing.join(", "))]
    IncompleteCredentials {
        section: String,
        missing: Vec<String>,
    },
}

impl ConfigError {
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::ConfigMissing { .. } => "ConfigMissing",
            ConfigError::Read { .. } => "IoError",
            ConfigError::Parse { .. } => "ConfigParse",
            ConfigError::KeyNotFound { .. } => "KeyNotFound",
            ConfigError::InvalidValue { .. } => "InvalidValue",
            ConfigError::IncompleteCredentials { .. } => "IncompleteCredentials",
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{}': {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{}': {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize JSON for '{}': {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse JSON in '{}': {source}", path.display())]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a single export step. Never fatal to the section.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ExportError {
    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::Api(e) => e.kind(),
            ExportError::Storage(_) => "IoError",
        }
    }

    /// Transient transport or server failures; local write errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExportError::Api(e) => e.is_retryable(),
            ExportError::Storage(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
