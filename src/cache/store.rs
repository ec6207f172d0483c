//! File-per-entry cache store
//!
//! Provides a `FileCache` that stores opaque byte payloads in a flat directory,
//! one file per label, and judges freshness from each file's modification time.

use std::fs::{self, Metadata};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::error::CacheError;
use super::key;
use crate::config::{CacheConfig, Ttl};

/// Prefix of the temporary files used for atomic writes
const TEMP_PREFIX: &str = ".sitecache-";
/// Suffix of the temporary files used for atomic writes
const TEMP_SUFFIX: &str = ".tmp";
/// Age after which a temporary write file is treated as abandoned
const ABANDONED_TEMP_SECS: i64 = 3600;
/// Mode requested for entry files, narrowed by the process umask like `fs::write`
#[cfg(unix)]
const ENTRY_MODE: u32 = 0o666;

/// Metadata about a single on-disk entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Location of the entry file
    pub path: PathBuf,
    /// Payload size in bytes
    pub size: u64,
    /// Last write time of the entry
    pub modified: DateTime<Utc>,
    /// Last instant at which the entry is still fresh, `None` if it never expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether a `get` would return the payload right now
    pub is_fresh: bool,
}

/// Label-addressed, TTL-bound cache backed by a directory
///
/// Each entry lives at `cache_dir/<sanitized label><extension>`. Nothing is
/// held in memory: freshness is recomputed from the file modification time on
/// every lookup, so several processes can share one directory. Stale files are
/// left on disk until they are overwritten, invalidated or purged.
#[derive(Debug, Clone)]
pub struct FileCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    ttl: Ttl,
    extension: String,
    clock: Arc<dyn Clock>,
}

impl FileCache {
    /// Creates a cache from `config` that uses wall-clock time
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache in `cache_dir` with the default TTL and extension
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self::new(CacheConfig::with_dir(cache_dir))
    }

    /// Creates a cache whose expiry checks read time from `clock`
    ///
    /// The configured extension goes through the same allow-list as labels, so
    /// it cannot smuggle path separators into file names.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache_dir: config.cache_dir,
            ttl: config.ttl,
            extension: key::sanitize(&config.extension),
            clock,
        }
    }

    /// Returns a handle on the same directory that applies a different TTL
    pub fn with_ttl(&self, ttl: Ttl) -> Self {
        Self {
            ttl,
            ..self.clone()
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn ttl(&self) -> Ttl {
        self.ttl
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Reduces a label to the key used in its file name
    pub fn sanitize(&self, label: &str) -> String {
        key::sanitize(label)
    }

    /// Returns the path of the file backing `label` (no I/O)
    pub fn path_for(&self, label: &str) -> PathBuf {
        self.cache_dir
            .join(key::file_name(&key::sanitize(label), &self.extension))
    }

    /// Creates the cache directory and any missing parents
    pub fn ensure_dir(&self) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).map_err(|source| CacheError::DirectoryUnavailable {
            path: self.cache_dir.clone(),
            source,
        })
    }

    /// Stores `data` under `label`, replacing any previous entry
    ///
    /// The payload is written to a temporary file in the cache directory and
    /// renamed over the entry, so concurrent readers see either the old or the
    /// new payload, never a truncated one. The directory is not created here;
    /// call `ensure_dir` first.
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(CacheError::DirectoryUnavailable)` if the directory is missing or read-only
    /// * `Err(CacheError::Write)` if the payload could not be written or moved into place
    pub fn set(&self, label: &str, data: &[u8]) -> Result<(), CacheError> {
        let path = self.path_for(label);

        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(ENTRY_MODE));
        }

        let mut tmp = builder
            .tempfile_in(&self.cache_dir)
            .map_err(|source| CacheError::DirectoryUnavailable {
                path: self.cache_dir.clone(),
                source,
            })?;

        tmp.write_all(data)
            .and_then(|_| tmp.flush())
            .map_err(|source| CacheError::Write {
                path: path.clone(),
                source,
            })?;

        tmp.persist(&path).map_err(|e| CacheError::Write {
            path: path.clone(),
            source: e.error,
        })?;

        debug!(label, path = %path.display(), bytes = data.len(), "cache entry written");
        Ok(())
    }

    /// Reads the payload stored under `label` if it is still fresh
    ///
    /// Returns `None` on a miss, on a stale entry, or when the file disappears
    /// between the freshness check and the read. Unexpected I/O errors are
    /// logged and also reported as a miss.
    pub fn get(&self, label: &str) -> Option<Vec<u8>> {
        let path = self.path_for(label);
        self.fresh_metadata(label, &path)?;

        match fs::read(&path) {
            Ok(data) => {
                debug!(label, bytes = data.len(), "cache hit");
                Some(data)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(label, "cache entry vanished before read");
                None
            }
            Err(e) => {
                warn!(label, path = %path.display(), error = %e, "failed to read cache entry");
                None
            }
        }
    }

    /// Returns true if an entry for `label` exists and has not expired
    ///
    /// The boundary is inclusive: with a TTL of `T` seconds an entry is still
    /// fresh exactly `T` seconds after it was written.
    pub fn is_cached(&self, label: &str) -> bool {
        let path = self.path_for(label);
        self.fresh_metadata(label, &path).is_some()
    }

    /// Deletes the entry for `label`
    ///
    /// # Returns
    /// * `Ok(true)` if a file was removed
    /// * `Ok(false)` if there was nothing to remove
    /// * `Err(CacheError::Remove)` if the file exists but could not be deleted
    pub fn invalidate(&self, label: &str) -> Result<bool, CacheError> {
        let path = self.path_for(label);
        let removed = remove_entry(&path)?;
        if removed {
            debug!(label, path = %path.display(), "cache entry invalidated");
        }
        Ok(removed)
    }

    /// Describes the on-disk entry for `label`, fresh or not
    pub fn entry_info(&self, label: &str) -> Option<EntryInfo> {
        let path = self.path_for(label);
        let metadata = fs::metadata(&path).ok().filter(Metadata::is_file)?;
        let modified = modified_at(&metadata)?;

        Some(EntryInfo {
            size: metadata.len(),
            modified,
            expires_at: self.expires_at(modified),
            is_fresh: self.is_fresh(Some(modified)),
            path,
        })
    }

    /// Deletes every entry in the cache directory
    ///
    /// Removes regular files carrying the cache extension (every regular file
    /// when the extension is empty) together with temporary write files older
    /// than an hour. Younger temporary files may belong to a write in flight
    /// in another process and are kept. Subdirectories and unrelated files are
    /// left alone. A missing directory counts as already empty.
    ///
    /// # Returns
    /// The number of files removed. If some deletions fail the remaining files
    /// are still attempted and the first failure is returned.
    pub fn clear_all(&self) -> Result<usize, CacheError> {
        let files = self
            .scan()?
            .into_iter()
            .filter(|(_, metadata, is_temp)| !is_temp || self.is_abandoned_temp(metadata))
            .map(|(path, _, _)| path);
        let removed = self.remove_all(files)?;
        info!(dir = %self.cache_dir.display(), removed, "cache cleared");
        Ok(removed)
    }

    /// Deletes entries whose TTL has elapsed and returns how many were removed
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let stale = self
            .scan()?
            .into_iter()
            .filter(|(_, metadata, is_temp)| !is_temp && !self.is_fresh(modified_at(metadata)))
            .map(|(path, _, _)| path);
        let removed = self.remove_all(stale)?;
        info!(dir = %self.cache_dir.display(), removed, "expired cache entries purged");
        Ok(removed)
    }

    /// Returns the cached payload for `label`, computing and storing it on a miss
    ///
    /// Storing is best-effort: a failed write is logged and the computed value
    /// is still returned. Errors from `compute` are passed through and nothing
    /// is stored.
    pub fn get_or_insert_with<F, E>(&self, label: &str, compute: F) -> Result<Vec<u8>, E>
    where
        F: FnOnce() -> Result<Vec<u8>, E>,
    {
        if let Some(data) = self.get(label) {
            return Ok(data);
        }

        let data = compute()?;
        if let Err(e) = self.set(label, &data) {
            warn!(label, error = %e, "could not cache computed value, continuing uncached");
        }
        Ok(data)
    }

    /// Looks up the metadata of a fresh entry file
    fn fresh_metadata(&self, label: &str, path: &Path) -> Option<Metadata> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => {
                warn!(label, path = %path.display(), "cache path is not a regular file");
                return None;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(label, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(label, path = %path.display(), error = %e, "failed to stat cache entry");
                return None;
            }
        };

        if !self.is_fresh(modified_at(&metadata)) {
            debug!(label, ttl = %self.ttl, "cache entry expired");
            return None;
        }
        Some(metadata)
    }

    /// Applies the TTL to a modification time; unknown times are stale
    /// unless entries never expire
    fn is_fresh(&self, modified: Option<DateTime<Utc>>) -> bool {
        match (self.ttl, modified) {
            (Ttl::Never, _) => true,
            (Ttl::Seconds(_), None) => false,
            (Ttl::Seconds(secs), Some(modified)) => {
                let ttl = i64::try_from(secs).unwrap_or(i64::MAX);
                modified.timestamp().saturating_add(ttl) >= self.clock.now().timestamp()
            }
        }
    }

    fn is_abandoned_temp(&self, metadata: &Metadata) -> bool {
        modified_at(metadata).is_some_and(|modified| {
            modified.timestamp().saturating_add(ABANDONED_TEMP_SECS) < self.clock.now().timestamp()
        })
    }

    fn expires_at(&self, modified: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.ttl.as_secs()?).ok()?;
        DateTime::from_timestamp(modified.timestamp().checked_add(secs)?, 0)
    }

    /// Lists regular files in the cache directory that belong to the cache,
    /// flagging temporary write files
    fn scan(&self) -> Result<Vec<(PathBuf, Metadata, bool)>, CacheError> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(CacheError::DirectoryUnavailable {
                    path: self.cache_dir.clone(),
                    source,
                })
            }
        };

        let mut files = Vec::new();
        for entry in entries.flatten() {
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let is_temp = name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX);
            if !is_temp && !name.ends_with(&self.extension) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) if metadata.is_file() => files.push((entry.path(), metadata, is_temp)),
                Ok(_) => {}
                Err(e) => debug!(file = %name, error = %e, "skipping unreadable cache file"),
            }
        }
        Ok(files)
    }

    fn remove_all(&self, paths: impl Iterator<Item = PathBuf>) -> Result<usize, CacheError> {
        let mut removed = 0;
        let mut first_error = None;

        for path in paths {
            match remove_entry(&path) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "failed to remove cache file");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }
}

/// Removes a file, treating an already-missing file as success
fn remove_entry(path: &Path) -> Result<bool, CacheError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CacheError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn modified_at(metadata: &Metadata) -> Option<DateTime<Utc>> {
    metadata.modified().ok().map(DateTime::<Utc>::from)
}
