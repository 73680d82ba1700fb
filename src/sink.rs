//! # Sink — Per-Query Result Policies
//!
//! The segment sieve hands every prime it confirms to a [`Sink`], which
//! keeps whatever the query shape needs and tells the sieve whether to keep
//! going. One sieve loop serves every query:
//!
//! | Sink | Keeps | Stops when |
//! |------|-------|------------|
//! | [`Count`] | a counter | never (runs to the limit) |
//! | [`CollectUpTo`] | primes ≤ bound | a prime exceeds the bound |
//! | [`CollectFirst`] | the first n primes | n primes are held |
//! | [`NthValue`] | the latest prime | the n-th prime is seen |
//! | [`MaxValue`] | the latest prime ≤ bound | a prime exceeds the bound |
//! | channel senders | nothing (publishes) | the receiver is gone |
//!
//! The channel impls are what back [`crate::stream`]: publishing blocks while
//! the bounded buffer is full, and a dropped receiver surfaces as
//! [`Flow::Stop`] on the next publish.

use std::sync::mpsc::SyncSender;

/// Whether the enumeration should continue after a prime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Consumer of primes in strictly increasing order.
pub trait Sink {
    fn accept(&mut self, prime: u64) -> Flow;
}

/// Counts primes.
#[derive(Debug, Default)]
pub struct Count {
    count: u64,
}

impl Count {
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Sink for Count {
    #[inline]
    fn accept(&mut self, _prime: u64) -> Flow {
        self.count += 1;
        Flow::Continue
    }
}

/// Collects every prime `<= bound`.
#[derive(Debug)]
pub struct CollectUpTo {
    bound: u64,
    primes: Vec<u64>,
}

impl CollectUpTo {
    pub fn new(bound: u64) -> Self {
        CollectUpTo {
            bound,
            primes: Vec::with_capacity(prime_count_estimate(bound)),
        }
    }

    pub fn into_primes(self) -> Vec<u64> {
        self.primes
    }
}

impl Sink for CollectUpTo {
    #[inline]
    fn accept(&mut self, prime: u64) -> Flow {
        if prime > self.bound {
            return Flow::Stop;
        }
        self.primes.push(prime);
        Flow::Continue
    }
}

/// Collects the first `n` primes.
#[derive(Debug)]
pub struct CollectFirst {
    n: usize,
    primes: Vec<u64>,
}

impl CollectFirst {
    pub fn new(n: usize) -> Self {
        CollectFirst {
            n,
            primes: Vec::with_capacity(n.min(PREALLOC_CAP)),
        }
    }

    pub fn into_primes(self) -> Vec<u64> {
        self.primes
    }
}

impl Sink for CollectFirst {
    #[inline]
    fn accept(&mut self, prime: u64) -> Flow {
        if self.primes.len() < self.n {
            self.primes.push(prime);
        }
        if self.primes.len() >= self.n {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }
}

/// Remembers the `n`-th prime (1-indexed).
#[derive(Debug)]
pub struct NthValue {
    n: u64,
    seen: u64,
    last: Option<u64>,
}

impl NthValue {
    pub fn new(n: u64) -> Self {
        NthValue {
            n,
            seen: 0,
            last: None,
        }
    }

    /// The n-th prime, once it has been seen.
    pub fn value(&self) -> Option<u64> {
        if self.seen >= self.n {
            self.last
        } else {
            None
        }
    }
}

impl Sink for NthValue {
    #[inline]
    fn accept(&mut self, prime: u64) -> Flow {
        self.seen += 1;
        self.last = Some(prime);
        if self.seen >= self.n {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }
}

/// Remembers the largest prime `<= bound` seen so far.
#[derive(Debug)]
pub struct MaxValue {
    bound: u64,
    last: Option<u64>,
}

impl MaxValue {
    pub fn new(bound: u64) -> Self {
        MaxValue { bound, last: None }
    }

    pub fn value(&self) -> Option<u64> {
        self.last
    }
}

impl Sink for MaxValue {
    #[inline]
    fn accept(&mut self, prime: u64) -> Flow {
        if prime > self.bound {
            return Flow::Stop;
        }
        self.last = Some(prime);
        Flow::Continue
    }
}

/// Publishes to a bounded std channel, blocking while it is full.
impl Sink for SyncSender<u64> {
    fn accept(&mut self, prime: u64) -> Flow {
        match self.send(prime) {
            Ok(()) => Flow::Continue,
            Err(_) => Flow::Stop,
        }
    }
}

/// Publishes to a bounded Tokio channel from a blocking thread.
///
/// Must not be driven from inside an async task: `blocking_send` panics
/// there.
impl Sink for tokio::sync::mpsc::Sender<u64> {
    fn accept(&mut self, prime: u64) -> Flow {
        match self.blocking_send(prime) {
            Ok(()) => Flow::Continue,
            Err(_) => Flow::Stop,
        }
    }
}

/// Upper limit on up-front allocation for collecting sinks; beyond this the
/// vector grows on demand.
const PREALLOC_CAP: usize = 1 << 20;

/// Rough upper estimate of pi(n), used only to size allocations.
fn prime_count_estimate(n: u64) -> usize {
    if n < 10 {
        return 4;
    }
    let nf = n as f64;
    ((1.3 * nf / nf.ln()) as usize).min(PREALLOC_CAP)
}
