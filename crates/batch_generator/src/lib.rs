//! # Batch Generator
//!
//! 批次生成模块。
//!
//! 负责：
//! - 查询可写分区，按分区从 frontier 拉取待抓取请求
//! - 域名黑名单过滤、编码、选择路由 key 后发布到分区 feed
//! - 每个批次结束后更新 stats

pub mod blacklist;
pub mod codec;
pub mod control;
pub mod error;
pub mod feeds;
pub mod frontier;
pub mod generator;
pub mod hostname;
pub mod key;
pub mod metrics;
pub mod stats;

#[cfg(test)]
mod test_support;

pub use blacklist::DomainBlacklist;
pub use codec::{encoder_for, BincodeEncoder, JsonEncoder, RequestEnvelope};
pub use control::{BatchSwitch, JobTracker};
pub use error::BatchGeneratorError;
pub use feeds::{
    partition_for_key, read_frames, FeedMessage, FileFeed, FileProducer, MemoryFeed,
    MemoryProducer,
};
pub use frontier::{MemoryFrontier, PullRequest};
pub use generator::{BatchGenerator, Collaborators, CycleOutcome};
pub use hostname::{parse_hostname, HostnameError};
pub use key::{FingerprintKey, HostnameKey, KeySelector, SelectKey};
pub use metrics::{CycleMetrics, CycleMetricsSnapshot, IdleReason};
pub use stats::MemoryStats;
pub use tokio_util::sync::CancellationToken;
