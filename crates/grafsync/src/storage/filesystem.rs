use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// Reads and writes export artifacts.
///
/// Paths are used as given; parent directories must already exist
/// (see [`DirectoryPlanner`](crate::planner::DirectoryPlanner)).
/// Existing files are overwritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        Self
    }

    /// Writes `value` as pretty-printed JSON followed by a newline.
    pub fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), StorageError> {
        let mut content = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
        content.push(b'\n');
        self.write_bytes(path, &content)
    }

    pub fn write_text(&self, path: &Path, text: &str) -> Result<(), StorageError> {
        self.write_bytes(path, text.as_bytes())
    }

    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, StorageError> {
        let content = self.read_text(path)?;
        serde_json::from_str(&content).map_err(|e| StorageError::Deserialize {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn read_text(&self, path: &Path) -> Result<String, StorageError> {
        std::fs::read_to_string(path).map_err(|e| StorageError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn write_bytes(&self, path: &Path, content: &[u8]) -> Result<(), StorageError> {
        std::fs::write(path, content).map_err(|e| StorageError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
