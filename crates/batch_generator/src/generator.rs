//! BatchGenerator - one dispatch cycle from frontier to feed

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use contracts::{
    BatchConfig, Encoder, FrontierSource, JobId, PartitionKeyStrategy, PartitionOracle,
    Publisher, StatsRecorder, StatsUpdate, WorkItem, BATCHES_AFTER_START, LAST_BATCH_GENERATED,
    LAST_BATCH_SIZE, PUSHED_SINCE_START,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::blacklist::DomainBlacklist;
use crate::control::{BatchSwitch, JobTracker};
use crate::error::BatchGeneratorError;
use crate::key::{KeySelector, SelectKey};
use crate::metrics::{CycleMetrics, IdleReason};

/// Everything the generator talks to
pub struct Collaborators<F, O, P> {
    pub frontier: F,
    pub oracle: O,
    pub producer: P,
    pub encoder: Arc<dyn Encoder>,
    pub stats: Arc<dyn StatsRecorder>,
}

/// Result of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing was published and no stats were recorded
    Idle(IdleReason),
    /// A batch went out; `count` includes items that failed to encode
    Completed { count: usize },
}

impl CycleOutcome {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle(_))
    }

    /// Tallied items, 0 when idle
    pub fn count(&self) -> usize {
        match self {
            Self::Idle(_) => 0,
            Self::Completed { count } => *count,
        }
    }
}

/// What happened to a single pulled request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemOutcome {
    Blacklisted,
    EncodingFailed,
    Published { keyed: bool },
}

/// Pulls pending requests and publishes them to partitioned feed
///
/// Owns its producer; after [`close`](Self::close) every cycle fails with
/// [`BatchGeneratorError::Closed`].
pub struct BatchGenerator<F, O, P> {
    frontier: F,
    oracle: O,
    producer: Option<P>,
    encoder: Arc<dyn Encoder>,
    stats: Arc<dyn StatsRecorder>,
    key_selector: KeySelector,
    blacklist: DomainBlacklist,
    switch: BatchSwitch,
    job: JobTracker,
    max_next_requests: usize,
    shutdown: CancellationToken,
    metrics: Arc<CycleMetrics>,
}

impl<F, O, P> BatchGenerator<F, O, P>
where
    F: FrontierSource,
    O: PartitionOracle,
    P: Publisher,
{
    /// Create a generator from batch settings
    ///
    /// # Errors
    /// `NotConfigured` when batch generation is switched off,
    /// `InvalidConfig` when the batch size is zero.
    pub fn new(
        config: &BatchConfig,
        parts: Collaborators<F, O, P>,
    ) -> Result<Self, BatchGeneratorError> {
        if config.no_batches {
            return Err(BatchGeneratorError::not_configured(
                "batch generation is disabled (no_batches)",
            ));
        }
        if config.max_next_requests == 0 {
            return Err(BatchGeneratorError::invalid_config(
                "max_next_requests",
                "must be > 0",
            ));
        }

        let blacklist = DomainBlacklist::new(&config.domains_blacklist);
        let key_selector = KeySelector::from_strategy(config.partition_key);

        info!(
            max_next_requests = config.max_next_requests,
            partition_key = ?config.partition_key,
            blacklisted_hosts = blacklist.len(),
            feed = %parts.producer.name(),
            codec = %parts.encoder.name(),
            "BatchGenerator created"
        );

        Ok(Self {
            frontier: parts.frontier,
            oracle: parts.oracle,
            producer: Some(parts.producer),
            encoder: parts.encoder,
            stats: parts.stats,
            key_selector,
            blacklist,
            switch: BatchSwitch::new(),
            job: JobTracker::new(config.job_id),
            max_next_requests: config.max_next_requests,
            shutdown: CancellationToken::new(),
            metrics: Arc::new(CycleMetrics::new()),
        })
    }

    /// Share an existing enable switch
    pub fn with_switch(mut self, switch: BatchSwitch) -> Self {
        self.switch = switch;
        self
    }

    /// Share an existing job tracker
    pub fn with_job_tracker(mut self, job: JobTracker) -> Self {
        self.job = job;
        self
    }

    /// Stop signal checked before the cycle and between items
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn switch(&self) -> &BatchSwitch {
        &self.switch
    }

    pub fn job_tracker(&self) -> &JobTracker {
        &self.job
    }

    pub fn metrics(&self) -> &Arc<CycleMetrics> {
        &self.metrics
    }

    pub fn frontier(&self) -> &F {
        &self.frontier
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn max_next_requests(&self) -> usize {
        self.max_next_requests
    }

    pub fn key_strategy(&self) -> PartitionKeyStrategy {
        self.key_selector.strategy()
    }

    pub fn is_closed(&self) -> bool {
        self.producer.is_none()
    }

    /// Run one dispatch cycle
    ///
    /// Item-level failures (blacklisted host, encoding error, unresolvable
    /// key) never abort the batch. Frontier, oracle and producer errors do,
    /// and such a cycle records no stats.
    #[instrument(name = "batch_generator_run_cycle", skip(self), fields(job_id = self.job.current()))]
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, BatchGeneratorError> {
        if self.producer.is_none() {
            return Err(BatchGeneratorError::Closed);
        }
        self.metrics.inc_cycles();

        if self.shutdown.is_cancelled() {
            return Ok(self.idle(IdleReason::ShuttingDown));
        }
        if !self.switch.is_enabled() {
            return Ok(self.idle(IdleReason::Disabled));
        }

        let partitions = self.oracle.available_partitions()?;
        if partitions.is_empty() {
            return Ok(self.idle(IdleReason::NoPartitions));
        }

        info!(partitions = ?partitions, "Getting new batches for partitions");
        let started = Instant::now();

        let items = self
            .frontier
            .get_next_requests(self.max_next_requests, &partitions)
            .await?;
        self.metrics.add_pulled(items.len() as u64);
        observability::record_requests_pulled(items.len());
        if items.is_empty() {
            return Ok(self.idle(IdleReason::EmptyFrontier));
        }

        let job_id = self.job.current();
        let total = items.len();
        let mut count = 0usize;
        let mut failed = 0usize;
        let mut unkeyed = 0usize;
        let mut interrupted = false;

        for (index, item) in items.into_iter().enumerate() {
            if self.shutdown.is_cancelled() {
                warn!(
                    processed = index,
                    remaining = total - index,
                    "Stop requested, leaving rest of batch"
                );
                interrupted = true;
                break;
            }

            match self.process_item(item, job_id)? {
                ItemOutcome::Blacklisted => continue,
                ItemOutcome::EncodingFailed => failed += 1,
                ItemOutcome::Published { keyed } => {
                    if !keyed {
                        unkeyed += 1;
                    }
                }
            }
            count += 1;
        }

        if count == 0 {
            let reason = if interrupted {
                IdleReason::ShuttingDown
            } else {
                IdleReason::AllFiltered
            };
            return Ok(self.idle(reason));
        }

        self.stats.update(
            StatsUpdate::new()
                .increment(PUSHED_SINCE_START, count as i64)
                .increment(BATCHES_AFTER_START, 1)
                .replace(LAST_BATCH_SIZE, count as i64)
                .replace(LAST_BATCH_GENERATED, Utc::now()),
        );

        self.metrics.inc_batches();
        observability::record_batch_generated(count);
        observability::record_cycle_duration_ms(started.elapsed().as_secs_f64() * 1000.0);

        info!(
            count,
            pulled = total,
            encoding_errors = failed,
            unkeyed,
            "Batch generated"
        );
        Ok(CycleOutcome::Completed { count })
    }

    fn process_item(
        &mut self,
        mut item: WorkItem,
        job_id: JobId,
    ) -> Result<ItemOutcome, BatchGeneratorError> {
        if self.blacklist.is_blacklisted(&item) {
            self.metrics.inc_blacklisted();
            observability::record_item_blacklisted();
            return Ok(ItemOutcome::Blacklisted);
        }

        item.tag_job(job_id);
        let payload = match self.encoder.encode(&item) {
            Ok(payload) => payload,
            Err(e) => {
                error!(
                    fingerprint = %item.fingerprint,
                    url = %item.url,
                    error = %e,
                    "Encoding error"
                );
                self.metrics.inc_encoding_errors();
                observability::record_encoding_error();
                return Ok(ItemOutcome::EncodingFailed);
            }
        };

        let key = self.key_selector.select_key(&item);
        let keyed = key.is_some();

        let producer = self.producer.as_mut().ok_or(BatchGeneratorError::Closed)?;
        producer.send(key, payload)?;

        self.metrics.inc_published(keyed);
        observability::record_item_published(producer.name(), keyed);
        Ok(ItemOutcome::Published { keyed })
    }

    fn idle(&self, reason: IdleReason) -> CycleOutcome {
        self.metrics.inc_idle_cycles();
        observability::record_cycle_idle(reason.as_str());
        debug!(reason = reason.as_str(), "Cycle idle");
        CycleOutcome::Idle(reason)
    }

    /// Release the producer
    ///
    /// Safe to call more than once; only the first call reaches the producer.
    #[instrument(name = "batch_generator_close", skip(self))]
    pub async fn close(&mut self) -> Result<(), BatchGeneratorError> {
        match self.producer.take() {
            Some(mut producer) => {
                producer.close().await?;
                info!(feed = %producer.name(), "Producer closed");
            }
            None => debug!("Producer already closed"),
        }
        Ok(())
    }
}
