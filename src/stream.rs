//! # Stream — Endless Prime Production on a Background Thread
//!
//! The enumeration runs as its own unit of work and publishes primes one at
//! a time through a small bounded buffer. A full buffer suspends the
//! producer until the consumer catches up, so sieve throughput never runs
//! ahead of demand by more than the buffer capacity.
//!
//! ## Cancellation
//!
//! Dropping the consumer handle is the cancel signal. For [`PrimeStream`]
//! the drop sets the shared [`Progress`] cancel flag (polled at every
//! segment boundary) and drops the receiver, which makes a producer blocked
//! on a full buffer wake with a send error and return. The drop then joins
//! the producer, so no thread outlives its stream.
//!
//! For [`stream_primes_async`] the producer notices the dropped receiver on
//! its next publish attempt.

use crate::config::SieveConfig;
use crate::error::Result;
use crate::progress::Progress;
use crate::sieve::{Completion, SegmentSieve, MAX_BOUND};
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Lazy, non-restartable sequence of all primes in increasing order.
///
/// `next()` blocks until the producer has the next prime. The sequence only
/// ends if the producer exhausts the `u64` domain.
pub struct PrimeStream {
    rx: Option<Receiver<u64>>,
    progress: Arc<Progress>,
    producer: Option<thread::JoinHandle<Completion>>,
}

impl PrimeStream {
    /// Start the producer thread. `config` is assumed validated.
    pub fn spawn(config: &SieveConfig) -> Self {
        let (mut tx, rx) = sync_channel::<u64>(config.channel_capacity);
        let progress = Progress::new();
        let mut sieve = SegmentSieve::from_config(config).with_progress(Arc::clone(&progress));
        let producer = thread::spawn(move || {
            let completion = sieve.run(MAX_BOUND, &mut tx);
            debug!(outcome = ?completion, "prime stream producer exited");
            completion
        });
        PrimeStream {
            rx: Some(rx),
            progress,
            producer: Some(producer),
        }
    }

    /// Counters of the producer's enumeration.
    pub fn progress(&self) -> &Arc<Progress> {
        &self.progress
    }
}

impl Iterator for PrimeStream {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        self.rx.as_ref()?.recv().ok()
    }
}

impl Drop for PrimeStream {
    fn drop(&mut self) {
        self.progress.cancel();
        drop(self.rx.take());
        if let Some(handle) = self.producer.take() {
            join_producer(handle);
        }
    }
}

/// Wait for a producer thread, logging rather than propagating a panic so a
/// stream can always be dropped.
fn join_producer(handle: thread::JoinHandle<Completion>) -> Option<Completion> {
    match handle.join() {
        Ok(completion) => Some(completion),
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".into());
            warn!(error = %message, "prime stream producer panicked");
            None
        }
    }
}

/// Async flavour of [`crate::stream_primes`]: the enumeration runs on Tokio's
/// blocking pool and publishes into a bounded `mpsc` channel.
///
/// Must be called from within a Tokio runtime. Dropping the receiver ends
/// the producer on its next publish attempt.
pub fn stream_primes_async(config: &SieveConfig) -> Result<tokio::sync::mpsc::Receiver<u64>> {
    config.validate()?;
    let (mut tx, rx) = tokio::sync::mpsc::channel::<u64>(config.channel_capacity);
    let mut sieve = SegmentSieve::from_config(config);
    tokio::task::spawn_blocking(move || {
        let completion = sieve.run(MAX_BOUND, &mut tx);
        debug!(outcome = ?completion, "async prime stream producer exited");
    });
    Ok(rx)
}
