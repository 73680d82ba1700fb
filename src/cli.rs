//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Contains config
//! layering (file, then flags/env), query execution with the optional
//! progress reporter, stream printing, and output formatting.

use anyhow::{Context, Result};
use primesieve::progress::Progress;
use primesieve::{stream_primes_with, Answer, Query, SieveConfig};
use std::io::{self, BufWriter, Write};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::{Cli, OutputFormat};

/// Defaults, overlaid by the config file, overlaid by flags/env vars.
pub fn resolve_config(cli: &Cli) -> Result<SieveConfig> {
    let mut config = match &cli.config {
        Some(path) => SieveConfig::load(path)?,
        None => SieveConfig::default(),
    };
    if let Some(segment_size) = cli.segment_size {
        config.segment_size = segment_size;
    }
    if let Some(channel_capacity) = cli.channel_capacity {
        config.channel_capacity = channel_capacity;
    }
    config
        .validate()
        .context("Invalid sieve configuration")?;
    Ok(config)
}

// ── Bounded Queries ─────────────────────────────────────────────

/// Run one bounded query and print its answer.
pub fn run_query(cli: &Cli, config: &SieveConfig, query: Query) -> Result<()> {
    info!(
        ?query,
        segment_size = config.segment_size,
        "primesieve starting"
    );

    let progress = Progress::new();
    let reporter = start_reporter(cli, &progress);
    let start = Instant::now();
    let result = query.run_with_progress(config, Some(Arc::clone(&progress)));
    progress.stop();
    if let Some(handle) = reporter {
        let _ = handle.join();
    }
    let answer = result.with_context(|| format!("Query {:?} failed", query))?;

    info!(
        segments = progress.segments(),
        sieved_to = progress.sieved_to(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "query complete"
    );
    if answer == Answer::Prime(None) {
        warn!("no prime in range");
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let written = write_answer(&mut out, &answer, cli.format).and_then(|()| out.flush());
    quiet_broken_pipe(written)
}

// ── Streaming ───────────────────────────────────────────────────

/// Print primes as the stream produces them, until `take` primes are out
/// or the reader goes away.
pub fn run_stream(cli: &Cli, config: &SieveConfig, take: Option<u64>) -> Result<()> {
    info!(
        take,
        segment_size = config.segment_size,
        channel_capacity = config.channel_capacity,
        "streaming primes"
    );

    let mut stream = stream_primes_with(config)?;
    let reporter = start_reporter(cli, stream.progress());
    let limit = take.unwrap_or(u64::MAX);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut written = 0u64;
    let mut status = Ok(());
    while written < limit {
        let Some(prime) = stream.next() else {
            break;
        };
        if let Err(e) = write_prime(&mut out, prime, cli.format) {
            status = Err(e);
            break;
        }
        written += 1;
    }
    if status.is_ok() {
        status = out.flush();
    }

    stream.progress().stop();
    if let Some(handle) = reporter {
        let _ = handle.join();
    }
    drop(stream);

    info!(written, "stream closed");
    quiet_broken_pipe(status)
}

// ── Output ──────────────────────────────────────────────────────

fn write_answer<W: Write>(out: &mut W, answer: &Answer, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, answer)?;
            writeln!(out)
        }
        OutputFormat::Text => match answer {
            Answer::Primes(primes) => {
                for p in primes {
                    writeln!(out, "{}", p)?;
                }
                Ok(())
            }
            Answer::Count(count) => writeln!(out, "{}", count),
            Answer::Prime(Some(p)) => writeln!(out, "{}", p),
            Answer::Prime(None) => Ok(()),
        },
    }
}

fn write_prime<W: Write>(out: &mut W, prime: u64, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, &serde_json::json!({ "prime": prime }))?;
            writeln!(out)
        }
        OutputFormat::Text => writeln!(out, "{}", prime),
    }
}

/// A closed pipe (`primesieve stream | head`) is a normal way to stop.
fn quiet_broken_pipe(status: io::Result<()>) -> Result<()> {
    match status {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("Failed to write output"),
    }
}

fn start_reporter(cli: &Cli, progress: &Arc<Progress>) -> Option<JoinHandle<()>> {
    if cli.progress_secs == 0 {
        return None;
    }
    Some(progress.start_reporter(Duration::from_secs(cli.progress_secs)))
}
