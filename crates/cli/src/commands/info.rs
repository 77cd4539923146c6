//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::WorkerConfig;
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    batch: BatchInfo,
    feed: FeedInfo,
}

#[derive(Serialize)]
struct BatchInfo {
    enabled: bool,
    max_next_requests: usize,
    partition_key: String,
    new_batch_delay_sec: f64,
    job_id: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    domains_blacklist: Vec<String>,
}

#[derive(Serialize)]
struct FeedInfo {
    partitions: u32,
    queue_capacity: usize,
    codec: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &WorkerConfig) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", config.version),
        batch: BatchInfo {
            enabled: !config.batch.no_batches,
            max_next_requests: config.batch.max_next_requests,
            partition_key: format!("{:?}", config.batch.partition_key),
            new_batch_delay_sec: config.batch.new_batch_delay_sec,
            job_id: config.batch.job_id,
            domains_blacklist: config.batch.domains_blacklist.clone(),
        },
        feed: FeedInfo {
            partitions: config.feed.partitions,
            queue_capacity: config.feed.queue_capacity,
            codec: format!("{:?}", config.feed.codec),
        },
    }
}

fn print_config_info(config: &WorkerConfig) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║             Frontier Batch Generator Configuration           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let batch = &config.batch;
    println!("⚙️  Batch");
    println!("   ├─ Version: {:?}", config.version);
    println!(
        "   ├─ Enabled: {}",
        if batch.no_batches { "no" } else { "yes" }
    );
    println!("   ├─ Max next requests: {}", batch.max_next_requests);
    println!("   ├─ Partition key: {:?}", batch.partition_key);
    println!("   ├─ New batch delay: {}s", batch.new_batch_delay_sec);
    println!("   └─ Job id: {}", batch.job_id);

    if !batch.domains_blacklist.is_empty() {
        println!("\n🚫 Black-listed hosts ({})", batch.domains_blacklist.len());
        for (i, host) in batch.domains_blacklist.iter().enumerate() {
            let prefix = if i == batch.domains_blacklist.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!("   {} {}", prefix, host);
        }
    }

    let feed = &config.feed;
    println!("\n📤 Feed");
    println!("   ├─ Partitions: {}", feed.partitions);
    println!("   ├─ Queue capacity: {}", feed.queue_capacity);
    println!("   └─ Codec: {:?}", feed.codec);

    println!();
}
