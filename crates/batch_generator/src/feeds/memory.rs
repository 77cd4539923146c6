//! MemoryFeed - in-process partitioned feed
//!
//! Queue capacity is a watermark: a partition at or above it is reported as
//! unavailable, but a producer that was already handed a batch is never
//! refused, matching a buffering producer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use contracts::{ContractError, PartitionId, PartitionKey, PartitionOracle, Publisher};
use tracing::{debug, instrument};

use super::{partition_for_key, FeedMessage};

struct FeedInner {
    name: String,
    capacity: usize,
    queues: Vec<Mutex<VecDeque<FeedMessage>>>,
    closed: AtomicBool,
    next_unkeyed: AtomicU32,
    oracle_calls: AtomicUsize,
}

/// Partitioned in-memory feed
///
/// Clones share the same queues; `producer()` hands out the write side.
#[derive(Clone)]
pub struct MemoryFeed {
    inner: Arc<FeedInner>,
}

impl MemoryFeed {
    /// Create a feed with `partitions` queues of `capacity` each
    pub fn new(name: impl Into<String>, partitions: u32, capacity: usize) -> Self {
        let queues = (0..partitions.max(1))
            .map(|_| Mutex::new(VecDeque::new()))
            .collect();
        Self {
            inner: Arc::new(FeedInner {
                name: name.into(),
                capacity,
                queues,
                closed: AtomicBool::new(false),
                next_unkeyed: AtomicU32::new(0),
                oracle_calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn partition_count(&self) -> u32 {
        self.inner.queues.len() as u32
    }

    /// Write side of the feed
    pub fn producer(&self) -> MemoryProducer {
        MemoryProducer {
            feed: self.clone(),
        }
    }

    /// Messages queued on `partition`, oldest first
    pub fn messages(&self, partition: PartitionId) -> Vec<FeedMessage> {
        self.queue(partition)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Messages queued on every partition, by partition then arrival
    pub fn all_messages(&self) -> Vec<FeedMessage> {
        (0..self.partition_count())
            .flat_map(|p| self.messages(p))
            .collect()
    }

    /// Consume everything queued on `partition`
    pub fn drain(&self, partition: PartitionId) -> Vec<FeedMessage> {
        self.queue(partition)
            .map(|mut q| q.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn len(&self, partition: PartitionId) -> usize {
        self.queue(partition).map(|q| q.len()).unwrap_or(0)
    }

    pub fn total_len(&self) -> usize {
        (0..self.partition_count()).map(|p| self.len(p)).sum()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Number of availability queries answered
    pub fn oracle_calls(&self) -> usize {
        self.inner.oracle_calls.load(Ordering::Relaxed)
    }

    /// Partition a message with `key` lands on
    pub fn route(&self, key: Option<&PartitionKey>) -> PartitionId {
        match key {
            Some(key) => partition_for_key(key, self.partition_count()),
            None => {
                self.inner.next_unkeyed.fetch_add(1, Ordering::Relaxed) % self.partition_count()
            }
        }
    }

    fn queue(&self, partition: PartitionId) -> Option<MutexGuard<'_, VecDeque<FeedMessage>>> {
        self.inner
            .queues
            .get(partition as usize)
            .map(|q| q.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl PartitionOracle for MemoryFeed {
    fn available_partitions(&self) -> Result<Vec<PartitionId>, ContractError> {
        self.inner.oracle_calls.fetch_add(1, Ordering::Relaxed);
        Ok((0..self.partition_count())
            .filter(|p| self.len(*p) < self.inner.capacity)
            .collect())
    }
}

/// Write side of a [`MemoryFeed`]
pub struct MemoryProducer {
    feed: MemoryFeed,
}

impl Publisher for MemoryProducer {
    fn name(&self) -> &str {
        self.feed.name()
    }

    fn send(&mut self, key: Option<PartitionKey>, payload: Bytes) -> Result<(), ContractError> {
        if self.feed.is_closed() {
            return Err(ContractError::ProducerClosed {
                feed: self.feed.name().to_string(),
            });
        }
        let partition = self.feed.route(key.as_ref());
        let mut queue = self.feed.queue(partition).ok_or_else(|| {
            ContractError::publish(self.feed.name(), format!("no partition {partition}"))
        })?;
        queue.push_back(FeedMessage { key, payload });
        Ok(())
    }

    #[instrument(name = "memory_producer_close", skip(self), fields(feed = %self.feed.name()))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.feed.inner.closed.store(true, Ordering::SeqCst);
        debug!(queued = self.feed.total_len(), "MemoryProducer closed");
        Ok(())
    }
}
