//! MemoryFrontier - queue-backed frontier for local runs and tests

use std::collections::{BTreeSet, VecDeque};

use contracts::{ContractError, FrontierSource, PartitionId, PartitionKey, WorkItem};
use tracing::{debug, instrument};

use crate::feeds::partition_for_key;
use crate::hostname::parse_hostname;

/// Arguments of one `get_next_requests` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub limit: usize,
    pub partitions: Vec<PartitionId>,
}

/// Frontier holding one FIFO queue per partition
///
/// Requests are assigned to a partition by hostname, the same way a
/// hostname-keyed feed routes them. Pulls take round-robin across the
/// requested partitions.
#[derive(Debug)]
pub struct MemoryFrontier {
    queues: Vec<VecDeque<WorkItem>>,
    pulls: Vec<PullRequest>,
}

impl MemoryFrontier {
    pub fn new(partitions: u32) -> Self {
        Self {
            queues: (0..partitions.max(1)).map(|_| VecDeque::new()).collect(),
            pulls: Vec::new(),
        }
    }

    /// Build a frontier pre-filled with `items`
    pub fn with_items(partitions: u32, items: impl IntoIterator<Item = WorkItem>) -> Self {
        let mut frontier = Self::new(partitions);
        frontier.extend(items);
        frontier
    }

    pub fn partition_count(&self) -> u32 {
        self.queues.len() as u32
    }

    /// Queue `item` on the partition its hostname maps to
    ///
    /// Requests whose host cannot be resolved go to partition 0.
    pub fn push(&mut self, item: WorkItem) -> PartitionId {
        let host = item
            .domain_name()
            .map(str::to_ascii_lowercase)
            .or_else(|| parse_hostname(&item.url).ok());
        let partition = host
            .map(|h| partition_for_key(&PartitionKey::from(h), self.partition_count()))
            .unwrap_or(0);
        self.push_to(partition, item);
        partition
    }

    /// Queue `item` on an explicit partition (clamped to the last one)
    pub fn push_to(&mut self, partition: PartitionId, item: WorkItem) {
        let index = (partition as usize).min(self.queues.len() - 1);
        self.queues[index].push_back(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = WorkItem>) {
        for item in items {
            self.push(item);
        }
    }

    pub fn pending(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Every pull served so far, oldest first
    pub fn pulls(&self) -> &[PullRequest] {
        &self.pulls
    }

    pub fn pull_count(&self) -> usize {
        self.pulls.len()
    }
}

impl FrontierSource for MemoryFrontier {
    #[instrument(name = "memory_frontier_pull", skip(self), fields(pending = self.pending()))]
    async fn get_next_requests(
        &mut self,
        limit: usize,
        partitions: &[PartitionId],
    ) -> Result<Vec<WorkItem>, ContractError> {
        self.pulls.push(PullRequest {
            limit,
            partitions: partitions.to_vec(),
        });

        let mut seen = BTreeSet::new();
        let wanted: Vec<usize> = partitions
            .iter()
            .map(|p| *p as usize)
            .filter(|p| *p < self.queues.len() && seen.insert(*p))
            .collect();

        let mut batch = Vec::with_capacity(limit.min(self.pending()));
        while batch.len() < limit {
            let mut progressed = false;
            for &index in &wanted {
                if batch.len() == limit {
                    break;
                }
                if let Some(item) = self.queues[index].pop_front() {
                    batch.push(item);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        debug!(returned = batch.len(), "Served frontier pull");
        Ok(batch)
    }
}
