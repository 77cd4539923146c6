//! Domain blacklist applied before a request is encoded

use std::collections::HashSet;

use contracts::WorkItem;
use tracing::{debug, warn};

use crate::hostname::parse_hostname;

/// Set of lowercase hostnames whose requests are dropped
#[derive(Debug, Clone, Default)]
pub struct DomainBlacklist {
    hosts: HashSet<String>,
}

impl DomainBlacklist {
    /// Build from configured hostnames (case-insensitive, blanks ignored)
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self { hosts }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether `item` must be dropped
    ///
    /// When the frontier attached domain metadata, its hostname is used as
    /// is and the URL is not parsed. Requests whose hostname cannot be
    /// resolved pass.
    pub fn is_blacklisted(&self, item: &WorkItem) -> bool {
        if self.hosts.is_empty() {
            return false;
        }

        let Some(hostname) = self.resolve_hostname(item) else {
            return false;
        };

        if self.hosts.contains(&hostname) {
            debug!(url = %item.url, hostname = %hostname, "Dropping black-listed hostname");
            return true;
        }
        false
    }

    fn resolve_hostname(&self, item: &WorkItem) -> Option<String> {
        if let Some(domain) = &item.domain {
            return domain.name.as_deref().map(str::to_ascii_lowercase);
        }
        match parse_hostname(&item.url) {
            Ok(hostname) => Some(hostname),
            Err(e) => {
                warn!(
                    fingerprint = %item.fingerprint,
                    url = %item.url,
                    error = %e,
                    "Cannot resolve hostname, request not filtered"
                );
                None
            }
        }
    }
}
