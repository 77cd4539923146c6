//! `dispatch` command implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use batch_generator::{
    encoder_for, BatchGenerator, CancellationToken, Collaborators, CycleMetricsSnapshot,
    CycleOutcome, FileFeed, MemoryFrontier, MemoryStats,
};
use contracts::{PartitionId, StatValue, StatsRecorder, StatsUpdate, WorkItem};
use observability::MetricsStatsRecorder;
use tracing::{info, warn};

use super::load_config;
use crate::cli::DispatchArgs;
use crate::error::{CliError, Result};

/// Forwards every update to several recorders
struct TeeStats {
    recorders: Vec<Arc<dyn StatsRecorder>>,
}

impl StatsRecorder for TeeStats {
    fn update(&self, update: StatsUpdate) {
        for recorder in &self.recorders {
            recorder.update(update.clone());
        }
    }
}

/// One partition file written by the cycle
#[derive(Debug, Clone)]
pub(crate) struct PartitionReport {
    pub partition: PartitionId,
    pub frames: usize,
    pub path: PathBuf,
}

/// What a dispatch run did
#[derive(Debug, Clone)]
pub(crate) struct DispatchReport {
    pub outcome: CycleOutcome,
    pub seeds: usize,
    pub left_in_frontier: usize,
    pub metrics: CycleMetricsSnapshot,
    pub stats: BTreeMap<String, StatValue>,
    pub partitions: Vec<PartitionReport>,
    pub duration: Duration,
}

impl DispatchReport {
    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Dispatch Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Cycle");
        match self.outcome {
            CycleOutcome::Idle(reason) => println!("   ├─ Outcome: idle ({})", reason.as_str()),
            CycleOutcome::Completed { count } => {
                println!("   ├─ Outcome: batch of {count}")
            }
        }
        println!("   ├─ Duration: {:.3}s", self.duration.as_secs_f64());
        println!("   ├─ Seeds loaded: {}", self.seeds);
        println!("   ├─ Pulled: {}", self.metrics.pulled);
        println!("   ├─ Black-listed: {}", self.metrics.blacklisted);
        println!("   ├─ Encoding errors: {}", self.metrics.encoding_errors);
        println!(
            "   ├─ Published: {} ({} without key)",
            self.metrics.published, self.metrics.unkeyed
        );
        println!("   └─ Left in frontier: {}", self.left_in_frontier);

        if !self.stats.is_empty() {
            println!("\n📈 Stats");
            let last = self.stats.len() - 1;
            for (i, (name, value)) in self.stats.iter().enumerate() {
                let prefix = if i == last { "└─" } else { "├─" };
                println!("   {prefix} {name}: {value}");
            }
        }

        println!("\n📤 Partitions ({})", self.partitions.len());
        let last = self.partitions.len().saturating_sub(1);
        for (i, p) in self.partitions.iter().enumerate() {
            let prefix = if i == last { "└─" } else { "├─" };
            println!(
                "   {prefix} {}: {} frames ({})",
                p.partition,
                p.frames,
                p.path.display()
            );
        }

        println!();
    }
}

/// Execute the `dispatch` command
pub async fn run_dispatch(args: &DispatchArgs) -> anyhow::Result<()> {
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)
            .context("Failed to start metrics endpoint")?;
    }

    let report = dispatch(args).await.context("Dispatch cycle failed")?;

    info!(
        outcome = ?report.outcome,
        count = report.outcome.count(),
        published = report.metrics.published,
        duration_secs = report.duration.as_secs_f64(),
        "Dispatch finished"
    );
    report.print_summary();
    Ok(())
}

/// Run exactly one cycle from the seed file into the output directory
pub(crate) async fn dispatch(args: &DispatchArgs) -> Result<DispatchReport> {
    info!(config = %args.config.display(), "Loading configuration");
    let config = load_config(&args.config)?;

    let seeds = load_seeds(&args.seeds)?;
    info!(
        seeds = seeds.len(),
        partitions = config.feed.partitions,
        codec = ?config.feed.codec,
        output = %args.output.display(),
        "Configuration loaded"
    );

    let feed = FileFeed::create(
        "file",
        &args.output,
        config.feed.partitions,
        config.feed.queue_capacity,
    )?;
    let stats = Arc::new(MemoryStats::new());
    let recorders: Vec<Arc<dyn StatsRecorder>> =
        vec![stats.clone(), Arc::new(MetricsStatsRecorder::new())];
    let recorder = TeeStats { recorders };

    let seed_count = seeds.len();
    let shutdown = CancellationToken::new();
    let mut generator = BatchGenerator::new(
        &config.batch,
        Collaborators {
            frontier: MemoryFrontier::with_items(config.feed.partitions, seeds),
            oracle: feed.clone(),
            producer: feed.producer(),
            encoder: encoder_for(config.feed.codec),
            stats: Arc::new(recorder),
        },
    )?
    .with_shutdown(shutdown.clone());

    if args.disabled {
        info!("Batch generation disabled from command line");
        generator.switch().disable();
    }

    let signal_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            warn!("Received shutdown signal, stopping cycle...");
            shutdown.cancel();
        }
    });

    let started = Instant::now();
    let outcome = generator.run_cycle().await;
    let closed = generator.close().await;
    signal_task.abort();

    let outcome = outcome?;
    closed?;

    let partitions = (0..feed.partition_count())
        .map(|partition| PartitionReport {
            partition,
            frames: feed.written(partition),
            path: feed.partition_path(partition),
        })
        .collect();

    Ok(DispatchReport {
        outcome,
        seeds: seed_count,
        left_in_frontier: generator.frontier().pending(),
        metrics: generator.metrics().snapshot(),
        stats: stats.snapshot(),
        partitions,
        duration: started.elapsed(),
    })
}

/// Read seed requests, one JSON object per line
///
/// Blank lines and lines starting with `#` are skipped.
pub(crate) fn load_seeds(path: &Path) -> Result<Vec<WorkItem>> {
    if !path.exists() {
        return Err(CliError::seeds_not_found(path));
    }

    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str::<WorkItem>(line)
                .map_err(|e| CliError::seed_parse(index + 1, e.to_string()))
        })
        .collect()
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
