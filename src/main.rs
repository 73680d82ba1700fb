//! # Main — CLI Entry Point
//!
//! Parses the command line, initializes logging, resolves the sieve
//! configuration and routes each subcommand to its query in `cli.rs`.
//!
//! ## Subcommands
//!
//! `first`, `up-to`, `count`, `nth`, `largest` run one bounded query and
//! print its answer. `stream` prints primes until `--take` is reached, the
//! reader closes the pipe, or the process is interrupted.
//!
//! ## Global Options
//!
//! - `--config` / `PRIMESIEVE_CONFIG`: TOML file with a `[sieve]` table.
//! - `--segment-size` / `PRIMESIEVE_SEGMENT_SIZE`: integers per segment.
//! - `--channel-capacity` / `PRIMESIEVE_CHANNEL_CAPACITY`: stream buffer.
//! - `--format`: `text` (one value per line) or `json`.
//! - `--progress-secs`: log sieve progress at this interval (0 = off).
//!
//! `LOG_FORMAT=json` switches logs to JSON; `RUST_LOG` filters them. Logs
//! always go to stderr so stdout carries only results.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use primesieve::Query;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "primesieve",
    version,
    about = "Generate primes with a segmented wheel sieve"
)]
struct Cli {
    /// TOML config file with a [sieve] table
    #[arg(long, env = "PRIMESIEVE_CONFIG")]
    config: Option<PathBuf>,

    /// Integers per sieve segment (overrides the config file)
    #[arg(long, env = "PRIMESIEVE_SEGMENT_SIZE")]
    segment_size: Option<usize>,

    /// Primes buffered between the stream producer and the printer
    #[arg(long, env = "PRIMESIEVE_CHANNEL_CAPACITY")]
    channel_capacity: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log sieve progress every N seconds (0 disables)
    #[arg(long, default_value_t = 0)]
    progress_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the first N primes
    First {
        /// How many primes to print
        #[arg(long)]
        count: u64,
    },
    /// Print every prime up to and including a bound
    UpTo {
        /// Inclusive upper bound
        #[arg(long)]
        bound: u64,
    },
    /// Count the primes up to and including a bound
    Count {
        /// Inclusive upper bound
        #[arg(long)]
        bound: u64,
    },
    /// Print the n-th prime (1-indexed)
    Nth {
        /// Ordinal, starting at 1
        #[arg(long)]
        n: u64,
    },
    /// Print the largest prime not exceeding a bound
    Largest {
        /// Inclusive upper bound
        #[arg(long)]
        bound: u64,
    },
    /// Stream primes in increasing order
    Stream {
        /// Stop after this many primes (default: never)
        #[arg(long)]
        take: Option<u64>,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let config = cli::resolve_config(&cli)?;

    match &cli.command {
        Commands::First { count } => cli::run_query(&cli, &config, Query::FirstN { n: *count }),
        Commands::UpTo { bound } => cli::run_query(&cli, &config, Query::UpTo { bound: *bound }),
        Commands::Count { bound } => cli::run_query(&cli, &config, Query::Count { bound: *bound }),
        Commands::Nth { n } => cli::run_query(&cli, &config, Query::Nth { n: *n }),
        Commands::Largest { bound } => {
            cli::run_query(&cli, &config, Query::Largest { bound: *bound })
        }
        Commands::Stream { take } => cli::run_stream(&cli, &config, *take),
    }
}
