//! # Query — The Six Prime Queries
//!
//! Each query validates its arguments at the call boundary, builds a fresh
//! [`SegmentSieve`] and the matching [`Sink`](crate::sink::Sink), and runs
//! one enumeration. Independent calls never share sieve state.
//!
//! | Query | Engine limit | Sink |
//! |-------|--------------|------|
//! | [`list_first_n`] | [`MAX_BOUND`] | [`CollectFirst`] |
//! | [`list_up_to`] | bound | [`CollectUpTo`] |
//! | [`count_up_to`] | bound | [`Count`] |
//! | [`nth_prime`] | [`MAX_BOUND`] | [`NthValue`] |
//! | [`largest_prime_up_to`] | bound | [`MaxValue`] |
//! | [`stream_primes`] | [`MAX_BOUND`] | channel sender |
//!
//! Bounds below 2 are not errors: they simply contain no primes. Ordinals
//! are checked against the Rosser–Dusart upper bound
//! p_n < n (ln n + ln ln n) (n ≥ 6), so a request whose answer could lie
//! beyond [`MAX_BOUND`] is refused before any sieving.

use crate::config::SieveConfig;
use crate::error::{Result, SieveError};
use crate::progress::Progress;
use crate::sieve::{Completion, SegmentSieve, MAX_BOUND};
use crate::sink::{CollectFirst, CollectUpTo, Count, MaxValue, NthValue};
use crate::stream::PrimeStream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A bounded query shape with its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Query {
    FirstN { n: u64 },
    UpTo { bound: u64 },
    Count { bound: u64 },
    Nth { n: u64 },
    Largest { bound: u64 },
}

/// The result of a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Primes(Vec<u64>),
    Count(u64),
    Prime(Option<u64>),
}

impl Query {
    pub fn run(&self, config: &SieveConfig) -> Result<Answer> {
        self.run_with_progress(config, None)
    }

    /// Run with a [`Progress`] handle attached to the engine, so a caller can
    /// watch or cancel a long enumeration from another thread.
    pub fn run_with_progress(
        &self,
        config: &SieveConfig,
        progress: Option<Arc<Progress>>,
    ) -> Result<Answer> {
        Ok(match *self {
            Query::FirstN { n } => Answer::Primes(first_n(n, config, progress)?),
            Query::UpTo { bound } => Answer::Primes(up_to(bound, config, progress)?),
            Query::Count { bound } => Answer::Count(count(bound, config, progress)?),
            Query::Nth { n } => Answer::Prime(Some(nth(n, config, progress)?)),
            Query::Largest { bound } => Answer::Prime(largest(bound, config, progress)?),
        })
    }
}

/// The first `n` primes, ascending.
pub fn list_first_n(n: u64) -> Result<Vec<u64>> {
    first_n(n, &SieveConfig::default(), None)
}

/// All primes `<= bound`, ascending.
pub fn list_up_to(bound: u64) -> Result<Vec<u64>> {
    up_to(bound, &SieveConfig::default(), None)
}

/// pi(bound): how many primes are `<= bound`.
pub fn count_up_to(bound: u64) -> Result<u64> {
    count(bound, &SieveConfig::default(), None)
}

/// The `n`-th prime, 1-indexed (`nth_prime(1) == 2`).
pub fn nth_prime(n: u64) -> Result<u64> {
    nth(n, &SieveConfig::default(), None)
}

/// The largest prime `<= bound`, or `None` when `bound < 2`.
pub fn largest_prime_up_to(bound: u64) -> Result<Option<u64>> {
    largest(bound, &SieveConfig::default(), None)
}

/// An endless, non-restartable stream of primes produced on a background
/// thread. See [`PrimeStream`].
pub fn stream_primes() -> PrimeStream {
    PrimeStream::spawn(&SieveConfig::default())
}

pub fn list_first_n_with(n: u64, config: &SieveConfig) -> Result<Vec<u64>> {
    first_n(n, config, None)
}

pub fn list_up_to_with(bound: u64, config: &SieveConfig) -> Result<Vec<u64>> {
    up_to(bound, config, None)
}

pub fn count_up_to_with(bound: u64, config: &SieveConfig) -> Result<u64> {
    count(bound, config, None)
}

pub fn nth_prime_with(n: u64, config: &SieveConfig) -> Result<u64> {
    nth(n, config, None)
}

pub fn largest_prime_up_to_with(bound: u64, config: &SieveConfig) -> Result<Option<u64>> {
    largest(bound, config, None)
}

pub fn stream_primes_with(config: &SieveConfig) -> Result<PrimeStream> {
    config.validate()?;
    Ok(PrimeStream::spawn(config))
}

fn engine(config: &SieveConfig, progress: Option<Arc<Progress>>) -> SegmentSieve {
    let sieve = SegmentSieve::from_config(config);
    match progress {
        Some(progress) => sieve.with_progress(progress),
        None => sieve,
    }
}

fn first_n(n: u64, config: &SieveConfig, progress: Option<Arc<Progress>>) -> Result<Vec<u64>> {
    config.validate()?;
    let len = usize::try_from(n).map_err(|_| {
        SieveError::InvalidArgument(format!("cannot hold {n} primes in memory"))
    })?;
    if n == 0 {
        return Ok(Vec::new());
    }
    check_ordinal(n)?;
    let mut sink = CollectFirst::new(len);
    finished(engine(config, progress).run(MAX_BOUND, &mut sink))?;
    Ok(sink.into_primes())
}

fn up_to(bound: u64, config: &SieveConfig, progress: Option<Arc<Progress>>) -> Result<Vec<u64>> {
    config.validate()?;
    check_bound(bound)?;
    let mut sink = CollectUpTo::new(bound);
    finished(engine(config, progress).run(bound, &mut sink))?;
    Ok(sink.into_primes())
}

fn count(bound: u64, config: &SieveConfig, progress: Option<Arc<Progress>>) -> Result<u64> {
    config.validate()?;
    check_bound(bound)?;
    let mut sink = Count::default();
    finished(engine(config, progress).run(bound, &mut sink))?;
    Ok(sink.count())
}

fn nth(n: u64, config: &SieveConfig, progress: Option<Arc<Progress>>) -> Result<u64> {
    config.validate()?;
    if n == 0 {
        return Err(SieveError::InvalidArgument(
            "n is 1-indexed and must be at least 1".into(),
        ));
    }
    check_ordinal(n)?;
    let mut sink = NthValue::new(n);
    finished(engine(config, progress).run(MAX_BOUND, &mut sink))?;
    // Only a run that exhausted the domain ends without the n-th prime.
    sink.value().ok_or(SieveError::DomainExhausted {
        what: "n",
        value: n,
        max: max_ordinal(),
    })
}

fn largest(
    bound: u64,
    config: &SieveConfig,
    progress: Option<Arc<Progress>>,
) -> Result<Option<u64>> {
    config.validate()?;
    check_bound(bound)?;
    let mut sink = MaxValue::new(bound);
    finished(engine(config, progress).run(bound, &mut sink))?;
    Ok(sink.value())
}

/// A cancelled run holds a partial answer; never hand it out.
fn finished(completion: Completion) -> Result<()> {
    match completion {
        Completion::Cancelled => Err(SieveError::Cancelled),
        Completion::Exhausted | Completion::Stopped => Ok(()),
    }
}

/// Upper bound on the `n`-th prime (Rosser 1938 / Dusart 1999): for n ≥ 6,
/// p_n < n (ln n + ln ln n). Below 6 a flat 12 covers p_1..p_5.
pub fn nth_prime_upper_bound(n: u64) -> f64 {
    if n < 6 {
        return 12.0;
    }
    let nf = n as f64;
    let ln = nf.ln();
    nf * (ln + ln.ln())
}

/// Largest ordinal whose upper bound still fits under [`MAX_BOUND`].
pub fn max_ordinal() -> u64 {
    let ceiling = MAX_BOUND as f64;
    let (mut lo, mut hi) = (1u64, MAX_BOUND);
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if nth_prime_upper_bound(mid) <= ceiling {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

fn check_bound(bound: u64) -> Result<()> {
    if bound > MAX_BOUND {
        return Err(SieveError::DomainExhausted {
            what: "bound",
            value: bound,
            max: MAX_BOUND,
        });
    }
    Ok(())
}

fn check_ordinal(n: u64) -> Result<()> {
    if nth_prime_upper_bound(n) > MAX_BOUND as f64 {
        return Err(SieveError::DomainExhausted {
            what: "n",
            value: n,
            max: max_ordinal(),
        });
    }
    Ok(())
}
