//! WorkerConfig - Config Loader output
//!
//! Batch generation knobs plus the shape of the outbound feed.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::JobId;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete worker configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct WorkerConfig {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Batch generation settings
    #[serde(default)]
    #[validate(nested)]
    pub batch: BatchConfig,

    /// Outbound feed settings
    #[serde(default)]
    #[validate(nested)]
    pub feed: FeedConfig,
}

/// Batch generation settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BatchConfig {
    /// Upper bound on requests pulled per cycle
    #[serde(default = "default_max_next_requests")]
    #[validate(range(min = 1, message = "max_next_requests must be > 0"))]
    pub max_next_requests: usize,

    /// Hostnames whose requests are dropped before encoding
    #[serde(default)]
    pub domains_blacklist: Vec<String>,

    /// How the routing key is derived
    #[serde(default)]
    pub partition_key: PartitionKeyStrategy,

    /// Delay between cycles, owned by the scheduler
    #[serde(default = "default_new_batch_delay")]
    pub new_batch_delay_sec: f64,

    /// Disable batch generation entirely
    #[serde(default)]
    pub no_batches: bool,

    /// Initial job id
    #[serde(default)]
    pub job_id: JobId,
}

impl BatchConfig {
    /// Scheduler backoff as a [`Duration`], zero when the value is negative or not finite
    pub fn new_batch_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.new_batch_delay_sec).unwrap_or_default()
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_next_requests: default_max_next_requests(),
            domains_blacklist: Vec::new(),
            partition_key: PartitionKeyStrategy::default(),
            new_batch_delay_sec: default_new_batch_delay(),
            no_batches: false,
            job_id: 0,
        }
    }
}

fn default_max_next_requests() -> usize {
    64
}

fn default_new_batch_delay() -> f64 {
    30.0
}

/// Routing key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionKeyStrategy {
    /// Route by request fingerprint
    #[default]
    Fingerprint,
    /// Route by URL hostname (keeps a host on one partition)
    Hostname,
}

/// Outbound feed settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedConfig {
    /// Number of partitions
    #[serde(default = "default_partitions")]
    #[validate(range(min = 1, message = "partitions must be > 0"))]
    pub partitions: u32,

    /// Per-partition queue capacity (memory feed)
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, message = "queue_capacity must be > 0"))]
    pub queue_capacity: usize,

    /// Payload codec
    #[serde(default)]
    pub codec: CodecKind,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            partitions: default_partitions(),
            queue_capacity: default_queue_capacity(),
            codec: CodecKind::default(),
        }
    }
}

fn default_partitions() -> u32 {
    1
}

fn default_queue_capacity() -> usize {
    1000
}

/// Payload codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    #[default]
    Json,
    Bincode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch.max_next_requests, 64);
        assert_eq!(config.batch.partition_key, PartitionKeyStrategy::Fingerprint);
        assert_eq!(config.batch.new_batch_delay(), Duration::from_secs(30));
    }

    #[test]
    fn test_new_batch_delay_out_of_range_is_zero() {
        let mut batch = BatchConfig::default();
        batch.new_batch_delay_sec = f64::INFINITY;
        assert_eq!(batch.new_batch_delay(), Duration::ZERO);
        batch.new_batch_delay_sec = f64::NAN;
        assert_eq!(batch.new_batch_delay(), Duration::ZERO);
        batch.new_batch_delay_sec = -1.0;
        assert_eq!(batch.new_batch_delay(), Duration::ZERO);
        batch.new_batch_delay_sec = 1.5;
        assert_eq!(batch.new_batch_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = WorkerConfig::default();
        config.batch.max_next_requests = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_next_requests"), "got: {err}");
    }

    #[test]
    fn test_strategy_from_json() {
        let batch: BatchConfig =
            serde_json::from_str(r#"{"partition_key": "hostname"}"#).unwrap();
        assert_eq!(batch.partition_key, PartitionKeyStrategy::Hostname);
        assert_eq!(batch.max_next_requests, 64);
    }
}
