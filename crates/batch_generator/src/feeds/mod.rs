//! Outbound feed implementations
//!
//! Contains MemoryFeed and FileFeed.

mod file;
mod memory;

pub use self::file::{read_frames, FileFeed, FileProducer};
pub use self::memory::{MemoryFeed, MemoryProducer};

use bytes::Bytes;
use contracts::{PartitionId, PartitionKey};
use sha2::{Digest, Sha256};

/// One message as stored by a feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMessage {
    pub key: Option<PartitionKey>,
    pub payload: Bytes,
}

/// Stable partition for `key` among `partitions`
pub fn partition_for_key(key: &PartitionKey, partitions: u32) -> PartitionId {
    let digest = Sha256::digest(key.as_bytes());
    let value = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    value % partitions.max(1)
}
