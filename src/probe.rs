//! Subdomain probing for bare domains
//!
//! When the host application resolves a bare domain such as `domain.com` it can
//! also try a configured set of subdomain variants (`www.domain.com`,
//! `api.domain.com`). This module turns a host plus that set into the ordered
//! list of host names to check.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Subdomain variants an administrator can enable for probing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Subdomain {
    Www,
    Api,
}

impl Subdomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subdomain::Www => "www",
            Subdomain::Api => "api",
        }
    }
}

impl fmt::Display for Subdomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes a host name: trims whitespace, lower-cases ASCII and drops a
/// trailing root dot
pub fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Returns true if `host` has no subdomain, i.e. exactly two non-empty labels
pub fn is_bare_domain(host: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    labels.len() == 2 && labels.iter().all(|label| !label.is_empty())
}

/// Lists the host names to check when resolving `host`
///
/// The normalized host always comes first. For a bare domain each enabled
/// subdomain variant follows in the order given, without duplicates. Hosts
/// that already carry a subdomain are returned alone.
///
/// # Examples
/// ```
/// use sitecache::probe::{candidate_hosts, Subdomain};
///
/// let hosts = candidate_hosts("Domain.com", &[Subdomain::Www, Subdomain::Api]);
/// assert_eq!(hosts, ["domain.com", "www.domain.com", "api.domain.com"]);
/// ```
pub fn candidate_hosts(host: &str, options: &[Subdomain]) -> Vec<String> {
    let host = normalize_host(host);
    if host.is_empty() {
        return Vec::new();
    }

    let mut hosts = vec![host.clone()];
    if is_bare_domain(&host) {
        for sub in options {
            let candidate = format!("{}.{}", sub, host);
            if !hosts.contains(&candidate) {
                hosts.push(candidate);
            }
        }
    }
    hosts
}
