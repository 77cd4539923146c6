//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the batch generator.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Seams
//! - [`FrontierSource`] / [`PartitionOracle`]: where pending work comes from and
//!   which outbound partitions can take more
//! - [`Encoder`] / [`Publisher`]: how a [`WorkItem`] becomes bytes on the feed
//! - [`StatsRecorder`]: where per-cycle counters end up

mod config;
mod error;
mod frontier;
mod partition;
mod publisher;
mod request;
mod stats;

pub use config::*;
pub use error::*;
pub use frontier::{FrontierSource, LocalFrontierSource, PartitionOracle};
pub use partition::{PartitionId, PartitionKey};
pub use publisher::{Encoder, LocalPublisher, Publisher};
pub use request::*;
pub use stats::*;
