//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Frontier batch generator - moves pending crawl requests onto a partitioned feed
#[derive(Parser, Debug)]
#[command(
    name = "frontier-batchgen",
    author,
    version,
    about = "Crawl frontier batch generator",
    long_about = "Pulls pending requests from a crawl frontier, drops black-listed hosts, \n\
                  encodes each request and publishes it to a partitioned feed.\n\n\
                  The dispatch command runs a single cycle over a JSONL seed file \n\
                  and writes the feed to one file per partition."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FRONTIER_BATCHGEN_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FRONTIER_BATCHGEN_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one dispatch cycle into a file feed
    Dispatch(DispatchArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `dispatch` command
#[derive(Parser, Debug, Clone)]
pub struct DispatchArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "worker.toml",
        env = "FRONTIER_BATCHGEN_CONFIG"
    )]
    pub config: PathBuf,

    /// Seed requests, one JSON object per line
    #[arg(short, long, env = "FRONTIER_BATCHGEN_SEEDS")]
    pub seeds: PathBuf,

    /// Output directory for partition files
    #[arg(
        short,
        long,
        default_value = "./feed",
        env = "FRONTIER_BATCHGEN_OUTPUT"
    )]
    pub output: PathBuf,

    /// Start with batch generation switched off
    #[arg(long)]
    pub disabled: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "FRONTIER_BATCHGEN_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "worker.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "worker.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dispatch() {
        let cli = Cli::parse_from([
            "frontier-batchgen",
            "-v",
            "dispatch",
            "--config",
            "w.toml",
            "--seeds",
            "seeds.jsonl",
            "--disabled",
        ]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Dispatch(args) => {
                assert_eq!(args.config, PathBuf::from("w.toml"));
                assert_eq!(args.seeds, PathBuf::from("seeds.jsonl"));
                assert_eq!(args.output, PathBuf::from("./feed"));
                assert!(args.disabled);
                assert_eq!(args.metrics_port, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
