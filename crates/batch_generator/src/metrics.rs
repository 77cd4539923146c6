//! Cycle metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Why a cycle produced no batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleReason {
    /// Switched off through the control plane
    Disabled,
    /// Stop signal asserted before the cycle started
    ShuttingDown,
    /// Feed reported no writable partition
    NoPartitions,
    /// Frontier returned nothing
    EmptyFrontier,
    /// Every pulled request was blacklisted
    AllFiltered,
}

impl IdleReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::ShuttingDown => "shutting_down",
            Self::NoPartitions => "no_partitions",
            Self::EmptyFrontier => "empty_frontier",
            Self::AllFiltered => "all_filtered",
        }
    }
}

/// Counters for one batch generator
#[derive(Debug, Default)]
pub struct CycleMetrics {
    /// Cycles started
    cycles: AtomicU64,
    /// Cycles that ended idle
    idle_cycles: AtomicU64,
    /// Cycles that produced a batch
    batches: AtomicU64,
    /// Requests pulled from the frontier
    pulled: AtomicU64,
    /// Requests dropped by the blacklist
    blacklisted: AtomicU64,
    /// Requests that failed to encode
    encoding_errors: AtomicU64,
    /// Payloads handed to the producer
    published: AtomicU64,
    /// Payloads handed over without a routing key
    unkeyed: AtomicU64,
}

impl CycleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_cycles(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_idle_cycles(&self) {
        self.idle_cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_batches(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_pulled(&self, count: u64) {
        self.pulled.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_blacklisted(&self) {
        self.blacklisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_encoding_errors(&self) {
        self.encoding_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_published(&self, keyed: bool) {
        self.published.fetch_add(1, Ordering::Relaxed);
        if !keyed {
            self.unkeyed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> CycleMetricsSnapshot {
        CycleMetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            idle_cycles: self.idle_cycles.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            pulled: self.pulled.load(Ordering::Relaxed),
            blacklisted: self.blacklisted.load(Ordering::Relaxed),
            encoding_errors: self.encoding_errors.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            unkeyed: self.unkeyed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of cycle metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleMetricsSnapshot {
    pub cycles: u64,
    pub idle_cycles: u64,
    pub batches: u64,
    pub pulled: u64,
    pub blacklisted: u64,
    pub encoding_errors: u64,
    pub published: u64,
    pub unkeyed: u64,
}
