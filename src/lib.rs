//! sitecache library
//!
//! A filesystem-backed TTL cache for memoizing domain-to-site resolution
//! results, together with the owner-side pieces that drive it: administrator
//! settings, the startup clear routine and subdomain probing.

pub mod cache;
pub mod cli;
pub mod config;
pub mod logging;
pub mod probe;
pub mod settings;
pub mod startup;

pub use cache::{CacheError, FileCache};
pub use config::{CacheConfig, Ttl};
