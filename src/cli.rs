//! Command-line interface parsing for sitecache
//!
//! This module handles parsing of CLI arguments using clap and turns the global
//! options into the `CacheConfig` and settings path the commands operate on.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::config::{CacheConfig, Ttl};
use crate::probe::Subdomain;

/// Settings file used when no XDG config directory can be determined
pub const FALLBACK_SETTINGS_FILE: &str = "sitecache-settings.json";

/// sitecache - Inspect and maintain the site resolution cache
#[derive(Parser, Debug)]
#[command(name = "sitecache")]
#[command(about = "Inspect and maintain the site resolution cache")]
#[command(version)]
pub struct Cli {
    /// Cache directory (defaults to the XDG cache directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Entry lifetime in seconds
    #[arg(long, global = true, value_name = "SECS", conflicts_with = "no_expiry")]
    pub ttl: Option<u64>,

    /// Entries never expire
    #[arg(long, global = true)]
    pub no_expiry: bool,

    /// Extension appended to cache file names
    #[arg(long, global = true, value_name = "EXT")]
    pub ext: Option<String>,

    /// Administrator settings file
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the cached payload for a label (exit code 1 on a miss)
    Get { label: String },

    /// Store a payload under a label
    ///
    /// Reads the payload from stdin when VALUE is omitted.
    Set { label: String, value: Option<String> },

    /// Remove the entry for a label
    Invalidate { label: String },

    /// Remove every entry in the cache directory
    Clear,

    /// Remove entries whose TTL has elapsed
    Purge,

    /// Print the file path backing a label
    Path { label: String },

    /// Show size, age and freshness of a label's entry
    Status { label: String },

    /// List the host names to check for a domain
    ///
    /// Uses the subdomains from the settings file unless --subdomains is given.
    Probe {
        domain: String,
        #[arg(long, value_enum, value_delimiter = ',')]
        subdomains: Option<Vec<Subdomain>>,
    },

    /// Run the startup routine (create the directory, honour a pending clear)
    Startup,

    /// Ask for the cache to be cleared on the next startup
    RequestClear,
}

impl Cli {
    /// Builds the cache configuration from the global options
    pub fn cache_config(&self) -> CacheConfig {
        let mut config = CacheConfig::default();
        if let Some(dir) = &self.dir {
            config.cache_dir = dir.clone();
        }
        if self.no_expiry {
            config.ttl = Ttl::Never;
        } else if let Some(secs) = self.ttl {
            config.ttl = Ttl::Seconds(secs);
        }
        if let Some(ext) = &self.ext {
            config.extension = ext.clone();
        }
        config
    }

    /// Returns the settings file path, defaulting to the XDG config directory
    pub fn settings_path(&self) -> PathBuf {
        if let Some(path) = &self.settings {
            return path.clone();
        }
        ProjectDirs::from("", "", "sitecache")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_SETTINGS_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_get() {
        let cli = Cli::parse_from(["sitecache", "get", "example.com"]);
        assert_eq!(
            cli.command,
            Command::Get {
                label: "example.com".to_string()
            }
        );
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_set_with_and_without_value() {
        let cli = Cli::parse_from(["sitecache", "set", "example.com", "siteA"]);
        assert_eq!(
            cli.command,
            Command::Set {
                label: "example.com".to_string(),
                value: Some("siteA".to_string())
            }
        );

        let cli = Cli::parse_from(["sitecache", "set", "example.com"]);
        assert_eq!(
            cli.command,
            Command::Set {
                label: "example.com".to_string(),
                value: None
            }
        );
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from(["sitecache", "clear", "--dir", "/tmp/sites", "-v"]);
        assert_eq!(cli.command, Command::Clear);
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/sites")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cache_config_defaults() {
        let cli = Cli::parse_from(["sitecache", "purge"]);
        let config = cli.cache_config();
        assert_eq!(config.ttl, Ttl::Seconds(3600));
        assert_eq!(config.extension, ".cache");
    }

    #[test]
    fn test_cache_config_overrides() {
        let cli = Cli::parse_from([
            "sitecache", "--dir", "/tmp/sites", "--ttl", "30", "--ext", ".site", "path", "a",
        ]);
        let config = cli.cache_config();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/sites"));
        assert_eq!(config.ttl, Ttl::Seconds(30));
        assert_eq!(config.extension, ".site");
    }

    #[test]
    fn test_no_expiry_flag() {
        let cli = Cli::parse_from(["sitecache", "--no-expiry", "get", "a"]);
        assert_eq!(cli.cache_config().ttl, Ttl::Never);
    }

    #[test]
    fn test_ttl_conflicts_with_no_expiry() {
        let result = Cli::try_parse_from(["sitecache", "--ttl", "5", "--no-expiry", "get", "a"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_probe_subdomains_list() {
        let cli = Cli::parse_from(["sitecache", "probe", "domain.com", "--subdomains", "www,api"]);
        assert_eq!(
            cli.command,
            Command::Probe {
                domain: "domain.com".to_string(),
                subdomains: Some(vec![Subdomain::Www, Subdomain::Api])
            }
        );
    }

    #[test]
    fn test_probe_rejects_unknown_subdomain() {
        let result = Cli::try_parse_from(["sitecache", "probe", "domain.com", "--subdomains", "ftp"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_path_override() {
        let cli = Cli::parse_from(["sitecache", "--settings", "/etc/sitecache.json", "startup"]);
        assert_eq!(cli.settings_path(), PathBuf::from("/etc/sitecache.json"));
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["sitecache"]).is_err());
    }
}
