//! # Progress — Atomic Enumeration Counters and Cancellation
//!
//! Lock-free progress tracking shared between an enumeration run and
//! whoever is watching it: the CLI's background reporter, or the consumer
//! side of a prime stream. The segment sieve updates the counters once per
//! segment (never per prime) and polls the cancel flag at every segment
//! boundary.
//!
//! ## Background Reporter
//!
//! A dedicated thread logs progress at a fixed interval: segments done,
//! high-water mark, primes found and throughput (integers/sec). It wakes in
//! short ticks so `stop()` followed by `join()` returns promptly.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// Reporter wake-up granularity.
const TICK: Duration = Duration::from_millis(50);

pub struct Progress {
    segments: AtomicU64,
    sieved_to: AtomicU64,
    found: AtomicU64,
    start: Instant,
    cancelled: AtomicBool,
    shutdown: AtomicBool,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Progress {
            segments: AtomicU64::new(0),
            sieved_to: AtomicU64::new(0),
            found: AtomicU64::new(0),
            start: Instant::now(),
            cancelled: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        })
    }

    /// Record a finished segment whose last integer was `sieved_to`.
    pub fn record_segment(&self, sieved_to: u64, found: u64) {
        self.segments.fetch_add(1, Ordering::Relaxed);
        self.sieved_to.fetch_max(sieved_to, Ordering::Relaxed);
        self.found.fetch_add(found, Ordering::Relaxed);
    }

    pub fn segments(&self) -> u64 {
        self.segments.load(Ordering::Relaxed)
    }

    pub fn sieved_to(&self) -> u64 {
        self.sieved_to.load(Ordering::Relaxed)
    }

    /// Primes emitted from segments (2, 3, 5, 7 are emitted before the
    /// first segment and not counted here).
    pub fn found(&self) -> u64 {
        self.found.load(Ordering::Relaxed)
    }

    /// Ask the enumeration to stop at its next segment boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn start_reporter(self: &Arc<Self>, interval: Duration) -> thread::JoinHandle<()> {
        let progress = Arc::clone(self);
        thread::spawn(move || {
            let mut last = Instant::now();
            loop {
                thread::sleep(TICK);
                if progress.shutdown.load(Ordering::Relaxed) {
                    break;
                }
                if last.elapsed() >= interval {
                    progress.print_status();
                    last = Instant::now();
                }
            }
        })
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let sieved_to = self.sieved_to();
        let rate = if elapsed.as_secs() > 0 {
            sieved_to as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        let h = elapsed.as_secs() / 3600;
        let m = (elapsed.as_secs() % 3600) / 60;
        let s = elapsed.as_secs() % 60;
        info!(
            segments = self.segments(),
            sieved_to,
            found = self.found(),
            rate = format_args!("{:.0}", rate),
            elapsed = format_args!("{:02}:{:02}:{:02}", h, m, s),
            "sieve progress"
        );
    }

    /// Stop the background reporter.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}
