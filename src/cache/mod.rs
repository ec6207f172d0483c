//! Cache module for memoizing resolution results on disk
//!
//! This module provides a file-per-entry store addressed by sanitized labels,
//! with time-based expiry judged from file modification times. Expired entries
//! are reported as misses but stay on disk until they are overwritten,
//! invalidated, purged or cleared.

mod clock;
mod error;
mod key;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CacheError;
pub use key::sanitize;
pub use store::{EntryInfo, FileCache};
