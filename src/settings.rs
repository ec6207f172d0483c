//! Administrator settings for the cache owner
//!
//! Two settings are persisted as a small JSON file: which subdomain variants
//! to probe for bare domains, and a one-shot "clear cache on next start" flag.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::probe::Subdomain;

/// Errors raised while loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read
    #[error("failed to read settings {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The settings file is not valid settings JSON
    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The settings file could not be written
    #[error("failed to write settings {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Persisted administrator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSettings {
    /// Subdomain variants to check in addition to a bare domain
    pub subdomain_options: Vec<Subdomain>,
    /// Clear the whole cache on the next start, then switch back off
    pub clear_cache: bool,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            subdomain_options: vec![Subdomain::Www],
            clear_cache: false,
        }
    }
}

/// Reads and writes `ModuleSettings` at a fixed path
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings, falling back to defaults when the file does not exist
    pub fn load(&self) -> Result<ModuleSettings, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file, using defaults");
                return Ok(ModuleSettings::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes settings as pretty JSON, replacing the file atomically
    pub fn save(&self, settings: &ModuleSettings) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Turns on the clear-cache flag so the next start wipes the cache
    pub fn request_clear(&self) -> Result<ModuleSettings, SettingsError> {
        let mut settings = self.load()?;
        settings.clear_cache = true;
        self.save(&settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (SettingsStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = SettingsStore::new(temp_dir.path().join("settings.json"));
        (store, temp_dir)
    }

    #[test]
    fn test_defaults_probe_www_and_do_not_clear() {
        let settings = ModuleSettings::default();
        assert_eq!(settings.subdomain_options, vec![Subdomain::Www]);
        assert!(!settings.clear_cache);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let (store, _temp_dir) = create_test_store();
        assert_eq!(store.load().unwrap(), ModuleSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let (store, _temp_dir) = create_test_store();
        let settings = ModuleSettings {
            subdomain_options: vec![Subdomain::Www, Subdomain::Api],
            clear_cache: true,
        };

        store.save(&settings).expect("Save should succeed");

        assert_eq!(store.load().unwrap(), settings);
        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"subdomain_options\""));
        assert!(content.contains("\"api\""));
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = SettingsStore::new(temp_dir.path().join("conf").join("settings.json"));

        store.save(&ModuleSettings::default()).expect("Save should succeed");

        assert!(store.path().exists());
    }

    #[test]
    fn test_load_fills_missing_fields_with_defaults() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), r#"{"clear_cache": true}"#).unwrap();

        let settings = store.load().unwrap();

        assert!(settings.clear_cache);
        assert_eq!(settings.subdomain_options, vec![Subdomain::Www]);
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), "{not json").unwrap();

        let result = store.load();

        assert!(matches!(result, Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_load_rejects_unknown_subdomain() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), r#"{"subdomain_options": ["*"]}"#).unwrap();

        assert!(store.load().is_err());
    }

    #[test]
    fn test_request_clear_persists_flag() {
        let (store, _temp_dir) = create_test_store();

        let settings = store.request_clear().unwrap();

        assert!(settings.clear_cache);
        assert!(store.load().unwrap().clear_cache);
    }
}
