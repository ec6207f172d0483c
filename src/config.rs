//! Cache configuration
//!
//! `CacheConfig` describes where entries live, how long they stay fresh and
//! which extension their files carry. It is plain data: building a
//! `FileCache` from it performs no I/O.

use std::fmt;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Default time-to-live for new entries (one hour)
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Default extension appended to every cache file name
pub const DEFAULT_EXTENSION: &str = ".cache";

/// Directory used when no XDG cache directory can be determined
pub const FALLBACK_CACHE_DIR: &str = "cache";

/// How long an entry stays fresh after it was written
///
/// Serialized as a number of seconds, with `-1` meaning "never expires".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Ttl {
    /// Entry is fresh while `mtime + secs >= now`
    Seconds(u64),
    /// Entry never goes stale
    Never,
}

impl Ttl {
    /// Returns the lifetime in seconds, or `None` for `Ttl::Never`
    pub fn as_secs(&self) -> Option<u64> {
        match self {
            Ttl::Seconds(secs) => Some(*secs),
            Ttl::Never => None,
        }
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Ttl::Seconds(DEFAULT_TTL_SECS)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Seconds(secs) => write!(f, "{}s", secs),
            Ttl::Never => write!(f, "never"),
        }
    }
}

impl TryFrom<i64> for Ttl {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Ttl::Never),
            secs if secs >= 0 => Ok(Ttl::Seconds(secs as u64)),
            other => Err(format!(
                "invalid ttl {}: expected seconds >= 0 or -1 for no expiry",
                other
            )),
        }
    }
}

impl From<Ttl> for i64 {
    fn from(ttl: Ttl) -> Self {
        match ttl {
            Ttl::Seconds(secs) => i64::try_from(secs).unwrap_or(i64::MAX),
            Ttl::Never => -1,
        }
    }
}

/// Settings for a `FileCache`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one file per entry
    pub cache_dir: PathBuf,
    /// Lifetime of an entry, measured from its file modification time
    pub ttl: Ttl,
    /// Suffix appended to the sanitized label
    pub extension: String,
}

impl CacheConfig {
    /// Creates a config for `cache_dir` with the default TTL and extension
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            ..Self::default()
        }
    }

    /// Returns the XDG-compliant cache directory for sitecache
    ///
    /// Uses `~/.cache/sitecache/` on Linux, or the platform equivalent.
    /// Returns `None` if the directory cannot be determined (e.g., no home directory).
    pub fn default_cache_dir() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "sitecache")?;
        Some(project_dirs.cache_dir().to_path_buf())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: Self::default_cache_dir().unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR)),
            ttl: Ttl::default(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Ttl::Seconds(3600));
        assert_eq!(config.extension, ".cache");
        assert!(!config.cache_dir.as_os_str().is_empty());
    }

    #[test]
    fn test_default_cache_dir_is_xdg_compliant() {
        if let Some(dir) = CacheConfig::default_cache_dir() {
            assert!(
                dir.to_string_lossy().contains("sitecache"),
                "Cache path should contain project name"
            );
        }
        // Passes if no home directory is available (e.g., in CI)
    }

    #[test]
    fn test_ttl_serializes_as_seconds_with_never_sentinel() {
        assert_eq!(serde_json::to_string(&Ttl::Seconds(60)).unwrap(), "60");
        assert_eq!(serde_json::to_string(&Ttl::Never).unwrap(), "-1");

        let ttl: Ttl = serde_json::from_str("-1").unwrap();
        assert_eq!(ttl, Ttl::Never);
        let ttl: Ttl = serde_json::from_str("0").unwrap();
        assert_eq!(ttl, Ttl::Seconds(0));
    }

    #[test]
    fn test_ttl_rejects_other_negative_values() {
        let result: Result<Ttl, _> = serde_json::from_str("-5");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_parses_partial_json() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"cache_dir": "/tmp/sites", "ttl": -1}"#).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/sites"));
        assert_eq!(config.ttl, Ttl::Never);
        assert_eq!(config.extension, ".cache");
    }

    #[test]
    fn test_ttl_display() {
        assert_eq!(Ttl::Seconds(30).to_string(), "30s");
        assert_eq!(Ttl::Never.to_string(), "never");
        assert_eq!(Ttl::Seconds(90).as_secs(), Some(90));
        assert_eq!(Ttl::Never.as_secs(), None);
    }
}
