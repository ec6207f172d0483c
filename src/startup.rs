//! Owner-side cache initialization
//!
//! Runs once before the cache is first used: reads the administrator settings,
//! makes sure the cache directory exists and honours a pending "clear cache"
//! request exactly once.

use thiserror::Error;
use tracing::{info, warn};

use crate::cache::FileCache;
use crate::settings::{ModuleSettings, SettingsError, SettingsStore};

/// Errors that stop the startup routine
///
/// Cache failures never appear here: the cache is an optimization, so they are
/// logged and the owner carries on uncached.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// What the startup routine did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    /// Settings in effect after startup
    pub settings: ModuleSettings,
    /// Number of entries removed by a pending clear request, if one ran
    pub cleared: Option<usize>,
}

/// Prepares `cache` for use according to the persisted settings
///
/// If the clear-cache flag is set the whole cache directory is cleared and the
/// flag is written back as off. When clearing fails the flag stays on, so the
/// clear is retried on the next start.
pub fn prepare_cache(
    cache: &FileCache,
    settings_store: &SettingsStore,
) -> Result<StartupReport, StartupError> {
    let mut settings = settings_store.load()?;

    if let Err(e) = cache.ensure_dir() {
        warn!(error = %e, "cache directory unavailable, running uncached");
    }

    let mut cleared = None;
    if settings.clear_cache {
        match cache.clear_all() {
            Ok(removed) => {
                settings.clear_cache = false;
                settings_store.save(&settings)?;
                info!(removed, "cleared cache on administrator request");
                cleared = Some(removed);
            }
            Err(e) => {
                warn!(error = %e, "failed to clear cache, will retry on next start");
            }
        }
    }

    Ok(StartupReport { settings, cleared })
}
