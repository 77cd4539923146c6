//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{PartitionKeyStrategy, WorkerConfig};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    max_next_requests: usize,
    partition_key: String,
    blacklisted_hosts: usize,
    partitions: u32,
    codec: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_config(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    max_next_requests: config.batch.max_next_requests,
                    partition_key: format!("{:?}", config.batch.partition_key),
                    blacklisted_hosts: config.batch.domains_blacklist.len(),
                    partitions: config.feed.partitions,
                    codec: format!("{:?}", config.feed.codec),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &WorkerConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.batch.no_batches {
        warnings.push("batch.no_batches is set - this worker will not generate batches".to_string());
    }

    if config.batch.partition_key == PartitionKeyStrategy::Hostname && config.feed.partitions == 1 {
        warnings.push(
            "partition_key = hostname with a single partition - keys have no effect".to_string(),
        );
    }

    if config.batch.max_next_requests > config.feed.queue_capacity {
        warnings.push(format!(
            "batch.max_next_requests ({}) exceeds feed.queue_capacity ({})",
            config.batch.max_next_requests, config.feed.queue_capacity
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for host in &config.batch.domains_blacklist {
        if !seen.insert(host.to_ascii_lowercase()) {
            warnings.push(format!("Duplicate black-listed host '{}'", host));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Batch size: {}", summary.max_next_requests);
            println!("  Partition key: {}", summary.partition_key);
            println!("  Black-listed hosts: {}", summary.blacklisted_hosts);
            println!("  Partitions: {}", summary.partitions);
            println!("  Codec: {}", summary.codec);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
