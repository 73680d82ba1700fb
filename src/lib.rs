//! # primesieve — Segmented Wheel Sieve Prime Queries
//!
//! Generates primes on demand under six query shapes, all served by one
//! enumeration engine:
//!
//! | Operation | Returns |
//! |-----------|---------|
//! | [`list_first_n`] | the first n primes |
//! | [`list_up_to`] | all primes ≤ bound |
//! | [`count_up_to`] | pi(bound) |
//! | [`nth_prime`] | the n-th prime (1-indexed) |
//! | [`largest_prime_up_to`] | the largest prime ≤ bound |
//! | [`stream_primes`] | an endless stream of primes |
//!
//! ## Layers
//!
//! - [`wheel`]: mod-210 gap table for skipping multiples of 2, 3, 5, 7.
//! - [`bootstrap`]: self-extending small-prime sieve with per-prime cursors.
//! - [`sieve`]: the segmented sieve loop and its bit-packed window.
//! - [`sink`]: per-query result policies (`accept(prime) -> continue|stop`).
//! - [`query`] / [`stream`]: argument checks and the public entry points.
//!
//! The engine works over `u64` up to [`MAX_BOUND`]; every call builds its
//! own state, so concurrent calls never share anything but the immutable
//! wheel table.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod progress;
pub mod query;
pub mod sieve;
pub mod sink;
pub mod stream;
pub mod wheel;

pub use config::SieveConfig;
pub use error::SieveError;
pub use query::{
    count_up_to, count_up_to_with, largest_prime_up_to, largest_prime_up_to_with, list_first_n,
    list_first_n_with, list_up_to, list_up_to_with, nth_prime, nth_prime_with, stream_primes,
    stream_primes_with, Answer, Query,
};
pub use sieve::{SegmentSieve, MAX_BOUND};
pub use stream::{stream_primes_async, PrimeStream};
