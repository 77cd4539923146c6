//! Partition key selection
//!
//! The strategy is fixed when the generator is built and never
//! re-evaluated per cycle.

use contracts::{PartitionKey, PartitionKeyStrategy, WorkItem};
use tracing::error;

use crate::hostname::parse_hostname;

/// Derives a routing key from a request
pub trait SelectKey {
    /// Routing key for `item`; `None` leaves routing to the producer
    fn select_key(&self, item: &WorkItem) -> Option<PartitionKey>;
}

/// Routes by fingerprint
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintKey;

impl SelectKey for FingerprintKey {
    fn select_key(&self, item: &WorkItem) -> Option<PartitionKey> {
        Some(PartitionKey::new(item.fingerprint.to_bytes()))
    }
}

/// Routes by lowercase URL hostname
#[derive(Debug, Clone, Copy, Default)]
pub struct HostnameKey;

impl SelectKey for HostnameKey {
    fn select_key(&self, item: &WorkItem) -> Option<PartitionKey> {
        match parse_hostname(&item.url) {
            Ok(hostname) => Some(PartitionKey::from(hostname)),
            Err(e) => {
                error!(
                    fingerprint = %item.fingerprint,
                    url = %item.url,
                    error = %e,
                    "URL parsing error"
                );
                None
            }
        }
    }
}

/// Key selector chosen from configuration
#[derive(Debug, Clone, Copy)]
pub enum KeySelector {
    Fingerprint(FingerprintKey),
    Hostname(HostnameKey),
}

impl KeySelector {
    pub fn from_strategy(strategy: PartitionKeyStrategy) -> Self {
        match strategy {
            PartitionKeyStrategy::Fingerprint => Self::Fingerprint(FingerprintKey),
            PartitionKeyStrategy::Hostname => Self::Hostname(HostnameKey),
        }
    }

    pub fn strategy(&self) -> PartitionKeyStrategy {
        match self {
            Self::Fingerprint(_) => PartitionKeyStrategy::Fingerprint,
            Self::Hostname(_) => PartitionKeyStrategy::Hostname,
        }
    }
}

impl SelectKey for KeySelector {
    #[inline]
    fn select_key(&self, item: &WorkItem) -> Option<PartitionKey> {
        match self {
            Self::Fingerprint(selector) => selector.select_key(item),
            Self::Hostname(selector) => selector.select_key(item),
        }
    }
}
