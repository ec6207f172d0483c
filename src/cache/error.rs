//! Cache error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by cache writes and deletions
///
/// A miss is never an error: lookups report absence with `None`/`false`.
/// Every variant is recoverable, the caller can always fall back to computing
/// the value without the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache directory is missing or cannot be written to
    #[error("cache directory {} is unavailable: {source}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing or renaming an entry failed
    #[error("failed to write cache entry {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Deleting an entry failed for a reason other than it being absent
    #[error("failed to remove cache entry {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
