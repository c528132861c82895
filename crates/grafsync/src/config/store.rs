//! Section/key lookups over an INI file.

use std::path::{Path, PathBuf};

use ini::Ini;

use crate::error::ConfigError;

/// Block holding the global request timeouts.
pub const TIMEOUTS_SECTION: &str = "requests";

/// Block whose keys every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Value returned for `[requests] connect` when the key is absent.
pub const DEFAULT_CONNECT_TIMEOUT: &str = "0.05";

/// Value returned for `[requests] read` when the key is absent.
pub const DEFAULT_READ_TIMEOUT: &str = "10.0";

/// Read-only view of one INI configuration source.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    ini: Ini,
}

impl ConfigStore {
    /// Loads the store from `path`.
    ///
    /// Fails with [`ConfigError::ConfigMissing`] when the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::ConfigMissing {
                path: path.to_path_buf(),
            });
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(err) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            ini,
        })
    }

    /// Parses the store from in-memory content. `origin` is only used in errors.
    pub fn from_str_with_origin(content: &str, origin: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = origin.into();
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { path, ini })
    }

    /// A store with no sections, used when an optional file is absent.
    pub fn empty(origin: impl Into<PathBuf>) -> Self {
        Self {
            path: origin.into(),
            ini: Ini::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All named sections in file order. The unnamed general section and
    /// [`DEFAULT_SECTION`] are skipped.
    pub fn sections(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.ini.sections().flatten() {
            if name != DEFAULT_SECTION && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Looks up `key` in `section`.
    ///
    /// Keys match case-insensitively. A key absent from an existing section
    /// is taken from [`DEFAULT_SECTION`]. The two timeout keys of
    /// [`TIMEOUTS_SECTION`] never fail: an absent `connect` or `read` yields
    /// its default.
    pub fn get(&self, section: &str, key: &str) -> Result<String, ConfigError> {
        if self.ini.section(Some(section)).is_some() {
            let inherited = || self.lookup(DEFAULT_SECTION, key);
            if let Some(value) = self.lookup(section, key).or_else(inherited) {
                return Ok(value.to_string());
            }
        }

        if section == TIMEOUTS_SECTION {
            match key {
                "connect" => return Ok(DEFAULT_CONNECT_TIMEOUT.to_string()),
                "read" => return Ok(DEFAULT_READ_TIMEOUT.to_string()),
                _ => {}
            }
        }

        Err(ConfigError::KeyNotFound {
            section: section.to_string(),
            key: key.to_string(),
        })
    }

    /// Like [`get`](Self::get) but maps `KeyNotFound` to `None`.
    pub fn get_optional(&self, section: &str, key: &str) -> Option<String> {
        self.get(section, key).ok()
    }

    fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        self.ini
            .section(Some(section))?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }
}
