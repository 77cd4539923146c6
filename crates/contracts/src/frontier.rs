//! Frontier-side traits: where work comes from and where it may go.

use crate::{ContractError, PartitionId, WorkItem};

/// Source of pending requests
///
/// Backends hand out at most `limit` requests scoped to `partitions`.
/// Returning fewer (or none) is not an error.
#[trait_variant::make(FrontierSource: Send)]
pub trait LocalFrontierSource {
    /// Fetch the next requests for the given partitions
    ///
    /// # Errors
    /// Returns backend errors (should include context)
    async fn get_next_requests(
        &mut self,
        limit: usize,
        partitions: &[PartitionId],
    ) -> Result<Vec<WorkItem>, ContractError>;
}

/// Reports which outbound partitions can currently accept messages
///
/// An empty answer means the feed is saturated and no batch should be pulled.
pub trait PartitionOracle: Send + Sync {
    /// Currently writable partitions
    fn available_partitions(&self) -> Result<Vec<PartitionId>, ContractError>;
}
