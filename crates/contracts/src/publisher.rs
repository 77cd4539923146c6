//! Publisher / Encoder traits - outbound feed interface

use bytes::Bytes;

use crate::{ContractError, PartitionKey, WorkItem};

/// Turns a request into a wire payload
pub trait Encoder: Send + Sync {
    /// Codec name (used for logging)
    fn name(&self) -> &str;

    /// Encode one request
    ///
    /// # Errors
    /// Returns [`ContractError::Encoding`] when fields are malformed or unserializable
    fn encode(&self, item: &WorkItem) -> Result<Bytes, ContractError>;
}

/// Partitioned outbound producer
///
/// `send` hands a payload over for delivery and returns without waiting for
/// acknowledgement. An absent key lets the producer pick its default route.
#[trait_variant::make(Publisher: Send)]
pub trait LocalPublisher {
    /// Feed name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Hand a payload over for delivery
    fn send(&mut self, key: Option<PartitionKey>, payload: Bytes) -> Result<(), ContractError>;

    /// Release the producer
    async fn close(&mut self) -> Result<(), ContractError>;
}
