//! # Sieve — Segmented Wheel Sieve of Eratosthenes
//!
//! The enumeration engine behind every query shape. Sweeps a fixed-size
//! window across the integer domain in consecutive segments, strikes
//! composites with the small primes supplied by the [`bootstrap`], then
//! walks the surviving candidates with the mod-210 [`wheel`] and feeds each
//! prime to a [`Sink`], in strictly increasing order, until the sink says
//! stop or the limit is passed.
//!
//! ## Algorithm
//!
//! For each segment `[low, low + S)`:
//!
//! 1. Reset the window to all-survive.
//! 2. Extend the bootstrap to `isqrt(high - 1)` so every prime whose square
//!    can land in this segment is known and armed.
//! 3. For each odd small prime, strike every `2p`-th position starting at its
//!    carried cursor, then rebase the cursor by `S` for the next segment.
//!    Stepping by `2p` is valid because only odd candidates are ever walked.
//! 4. Walk wheel candidates below `high`; emit window survivors.
//!
//! 2, 3, 5 and 7 are emitted before the first segment. Complexity is
//! O(n log log n) time and O(S + √n) space for a limit of n.
//!
//! The window is a [`BitSieve`]: 32768 candidates occupy 4 KiB, well inside
//! L1 on current hardware.
//!
//! [`bootstrap`]: crate::bootstrap
//! [`wheel`]: crate::wheel

use crate::bootstrap::SmallPrimes;
use crate::config::SieveConfig;
use crate::progress::Progress;
use crate::sink::{Flow, Sink};
use crate::wheel::{WheelCursor, WHEEL_PRIMES};
use std::sync::Arc;
use tracing::debug;

/// Default number of integers per segment.
pub const SEGMENT_SIZE: usize = 32_768;

/// Largest bound the engine accepts. Keeps `low + segment`, `candidate + gap`
/// and the square of every sieving prime inside `u64`.
pub const MAX_BOUND: u64 = u64::MAX - (1 << 32);

/// How an enumeration run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Every prime up to the limit was offered to the sink.
    Exhausted,
    /// The sink asked to stop.
    Stopped,
    /// The attached [`Progress`] was cancelled at a segment boundary.
    Cancelled,
}

/// One enumeration engine: the small-prime table, the segment window and
/// an optional progress/cancellation handle.
///
/// Not shareable between threads while running; independent queries build
/// their own engine. Running the same engine again reuses its small-prime
/// table but re-arms every cursor.
pub struct SegmentSieve {
    small: SmallPrimes,
    window: BitSieve,
    segment_size: u64,
    progress: Option<Arc<Progress>>,
}

impl Default for SegmentSieve {
    fn default() -> Self {
        Self::new(SEGMENT_SIZE)
    }
}

impl SegmentSieve {
    /// Create an engine with the given segment length (assumed validated,
    /// see [`SieveConfig::validate`]).
    pub fn new(segment_size: usize) -> Self {
        SegmentSieve {
            small: SmallPrimes::new(),
            window: BitSieve::new_all_set(segment_size),
            segment_size: segment_size as u64,
            progress: None,
        }
    }

    pub fn from_config(config: &SieveConfig) -> Self {
        Self::new(config.segment_size)
    }

    /// Attach a progress handle; the run updates it once per segment and
    /// stops when it is cancelled.
    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    #[inline]
    pub fn segment_size(&self) -> usize {
        self.segment_size as usize
    }

    /// The small-prime table built so far.
    pub fn small_primes(&self) -> &SmallPrimes {
        &self.small
    }

    /// Offer every prime `<= limit` to `sink`, ascending, until it stops.
    ///
    /// `limit` must not exceed [`MAX_BOUND`].
    pub fn run<S: Sink + ?Sized>(&mut self, limit: u64, sink: &mut S) -> Completion {
        debug_assert!(limit <= MAX_BOUND, "limit {limit} beyond MAX_BOUND");
        let limit = limit.min(MAX_BOUND);
        self.small.disarm();

        for &p in &WHEEL_PRIMES {
            if p > limit {
                return Completion::Exhausted;
            }
            if sink.accept(p) == Flow::Stop {
                return Completion::Stopped;
            }
        }

        let seg = self.segment_size;
        let mut candidate = WheelCursor::new();
        let mut low = 0u64;
        let mut segments = 0u64;
        let mut sieved_to;

        let completion = loop {
            let high = low.saturating_add(seg).min(limit + 1);

            self.window.fill();
            self.small.ensure_sieved_to((high - 1).isqrt(), low);
            for (p, cursor) in self.small.sieving_mut() {
                let step = 2 * p;
                let mut c = *cursor;
                while c < seg {
                    self.window.clear(c as usize);
                    c += step;
                }
                *cursor = c - seg;
            }

            let mut found = 0u64;
            let mut stopped = false;
            while candidate.value < high {
                if self.window.get((candidate.value - low) as usize) {
                    found += 1;
                    if sink.accept(candidate.value) == Flow::Stop {
                        stopped = true;
                        break;
                    }
                }
                candidate.step();
            }

            segments += 1;
            sieved_to = high - 1;
            if let Some(progress) = &self.progress {
                progress.record_segment(sieved_to, found);
            }
            if stopped {
                break Completion::Stopped;
            }
            if high > limit {
                break Completion::Exhausted;
            }
            if self.progress.as_ref().is_some_and(|p| p.is_cancelled()) {
                break Completion::Cancelled;
            }
            low += seg;
        };

        debug!(
            limit,
            segments,
            sieved_to,
            small_primes = self.small.primes().len(),
            outcome = ?completion,
            "enumeration finished"
        );
        completion
    }
}

/// Packed bit array used for both the segment window and the bootstrap's
/// composite table.
///
/// 8× memory reduction over `Vec<bool>`. Bit layout: bit `i` is stored in
/// word `i / 64`, bit position `i % 64`. A set bit (1) means the integer
/// **survives** (not yet known composite); a clear bit (0) means it was
/// struck.
pub struct BitSieve {
    words: Vec<u64>,
    len: usize,
}

impl BitSieve {
    /// Create a sieve of `len` bits, all set to 1 (all candidates survive).
    pub fn new_all_set(len: usize) -> Self {
        let mut sieve = BitSieve {
            words: vec![u64::MAX; len.div_ceil(64)],
            len,
        };
        sieve.trim_tail();
        sieve
    }

    /// Number of bits in this sieve.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if sieve has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get bit `index`. Returns `true` if the bit is set (survivor).
    ///
    /// # Panics
    /// Panics if `index >= len`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        debug_assert!(
            index < self.len,
            "BitSieve index out of bounds: {} >= {}",
            index,
            self.len
        );
        let word = self.words[index / 64];
        word & (1u64 << (index % 64)) != 0
    }

    /// Clear bit `index` to 0 (struck).
    #[inline]
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.words[index / 64] &= !(1u64 << (index % 64));
    }

    /// Set every bit back to 1 without reallocating.
    pub fn fill(&mut self) {
        self.words.fill(u64::MAX);
        self.trim_tail();
    }

    /// Extend to `new_len` bits; the added bits are set. Never shrinks.
    pub fn grow(&mut self, new_len: usize) {
        if new_len <= self.len {
            return;
        }
        if self.len % 64 != 0 {
            // Reopen the unused high bits of the old last word.
            let last = self.words.len() - 1;
            self.words[last] |= u64::MAX << (self.len % 64);
        }
        self.words.resize(new_len.div_ceil(64), u64::MAX);
        self.len = new_len;
        self.trim_tail();
    }

    /// Clear the unused high bits of the last word.
    fn trim_tail(&mut self) {
        let extra = self.words.len() * 64 - self.len;
        if extra > 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= u64::MAX >> extra;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! # Tests for the Segmented Sieve
    //!
    //! Validates the engine against a naive trial-division oracle across
    //! segment boundaries and odd segment sizes, checks the prime counting
    //! function at known points (OEIS A000720), the early-stop contract of
    //! sinks, cancellation through [`Progress`], and the [`BitSieve`] word
    //! arithmetic the window and bootstrap rely on.

    use super::*;
    use crate::sink::{CollectFirst, CollectUpTo, Count};

    fn is_prime_naive(n: u64) -> bool {
        n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
    }

    fn primes_up_to(segment_size: usize, limit: u64) -> Vec<u64> {
        let mut sink = CollectUpTo::new(limit);
        SegmentSieve::new(segment_size).run(limit, &mut sink);
        sink.into_primes()
    }

    // ── Enumeration ──────────────────────────────────────────────

    #[test]
    fn small_limits() {
        assert_eq!(primes_up_to(SEGMENT_SIZE, 0), Vec::<u64>::new());
        assert_eq!(primes_up_to(SEGMENT_SIZE, 1), Vec::<u64>::new());
        assert_eq!(primes_up_to(SEGMENT_SIZE, 2), vec![2]);
        assert_eq!(primes_up_to(SEGMENT_SIZE, 3), vec![2, 3]);
        assert_eq!(primes_up_to(SEGMENT_SIZE, 4), vec![2, 3]);
        assert_eq!(primes_up_to(SEGMENT_SIZE, 7), vec![2, 3, 5, 7]);
        assert_eq!(primes_up_to(SEGMENT_SIZE, 10), vec![2, 3, 5, 7]);
        assert_eq!(primes_up_to(SEGMENT_SIZE, 11), vec![2, 3, 5, 7, 11]);
        assert_eq!(
            primes_up_to(SEGMENT_SIZE, 30),
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]
        );
    }

    /// Squares of small primes (121, 169, 289, ...) are the first
    /// composites the wheel cannot skip.
    #[test]
    fn wheel_survivor_composites_are_struck() {
        let primes = primes_up_to(SEGMENT_SIZE, 1000);
        for composite in [121, 143, 169, 187, 209, 221, 289, 323, 361, 529, 841, 961] {
            assert!(!primes.contains(&composite), "{composite} emitted as prime");
        }
    }

    /// A tiny window forces hundreds of segments and cursor rebases; the
    /// output must still match trial division exactly.
    #[test]
    fn matches_naive_across_many_segments() {
        let expected: Vec<u64> = (0..=20_000).filter(|&n| is_prime_naive(n)).collect();
        for segment_size in [64, 100, 210, 1000, 4096, SEGMENT_SIZE] {
            assert_eq!(
                primes_up_to(segment_size, 20_000),
                expected,
                "segment_size = {segment_size}"
            );
        }
    }

    /// Limits at, just below and just above a segment boundary.
    #[test]
    fn limits_around_segment_boundaries() {
        for limit in [63, 64, 65, 127, 128, 129, 191, 192, 193] {
            let expected: Vec<u64> = (0..=limit).filter(|&n| is_prime_naive(n)).collect();
            assert_eq!(primes_up_to(64, limit), expected, "limit = {limit}");
        }
    }

    /// pi(x) at powers of ten, OEIS A000720.
    #[test]
    fn prime_counting_known_values() {
        for (limit, pi) in [
            (100, 25),
            (1_000, 168),
            (10_000, 1_229),
            (100_000, 9_592),
            (1_000_000, 78_498),
        ] {
            let mut sink = Count::default();
            SegmentSieve::default().run(limit, &mut sink);
            assert_eq!(sink.count(), pi, "pi({limit})");
        }
    }

    #[test]
    fn prime_counting_ten_million() {
        let mut sink = Count::default();
        let completion = SegmentSieve::default().run(10_000_000, &mut sink);
        assert_eq!(completion, Completion::Exhausted);
        assert_eq!(sink.count(), 664_579);
    }

    /// The bound leaves room for one more segment, and the square of any
    /// prime the bootstrap can hold still fits in a u64.
    #[test]
    fn max_bound_has_headroom() {
        assert!(MAX_BOUND.checked_add(SEGMENT_SIZE as u64).is_some());
        assert!(MAX_BOUND.checked_add(1 << 31).is_some());
        let root = MAX_BOUND.isqrt();
        assert!(root < crate::bootstrap::SQRT_CEILING);
        assert!(root.checked_mul(root).is_some());
        let largest_sieving = crate::bootstrap::SQRT_CEILING - 1;
        assert!(largest_sieving.checked_mul(largest_sieving).is_some());
    }

    // ── Stopping ──────────────────────────────────────────────────

    /// The engine halts the moment the sink stops, mid-segment.
    #[test]
    fn sink_stop_halts_immediately() {
        let mut sink = CollectFirst::new(1000);
        let completion = SegmentSieve::default().run(MAX_BOUND, &mut sink);
        assert_eq!(completion, Completion::Stopped);
        let primes = sink.into_primes();
        assert_eq!(primes.len(), 1000);
        assert_eq!(primes.last(), Some(&7919));
    }

    #[test]
    fn stop_within_wheel_primes() {
        let mut sink = CollectFirst::new(3);
        assert_eq!(
            SegmentSieve::default().run(MAX_BOUND, &mut sink),
            Completion::Stopped
        );
        assert_eq!(sink.into_primes(), vec![2, 3, 5]);
    }

    #[test]
    fn cancelled_progress_stops_at_segment_boundary() {
        let progress = Progress::new();
        progress.cancel();
        let mut sink = Count::default();
        let completion = SegmentSieve::new(1024)
            .with_progress(Arc::clone(&progress))
            .run(MAX_BOUND, &mut sink);
        assert_eq!(completion, Completion::Cancelled);
        // Exactly one segment ran: every prime below 1024.
        assert_eq!(sink.count(), 172);
        assert_eq!(progress.segments(), 1);
    }

    #[test]
    fn progress_tracks_segments_and_primes() {
        let progress = Progress::new();
        let mut sink = Count::default();
        SegmentSieve::new(1000)
            .with_progress(Arc::clone(&progress))
            .run(10_000, &mut sink);
        assert_eq!(progress.segments(), 11);
        assert_eq!(progress.sieved_to(), 10_000);
        // 2, 3, 5, 7 are emitted before the first segment.
        assert_eq!(progress.found() + 4, sink.count());
    }

    /// A run that stops mid-segment reports that whole segment as sieved,
    /// not the one before it.
    #[test]
    fn stopped_run_reports_last_segment_end() {
        let progress = Progress::new();
        let mut sink = CollectFirst::new(200);
        let completion = SegmentSieve::new(1000)
            .with_progress(Arc::clone(&progress))
            .run(MAX_BOUND, &mut sink);
        assert_eq!(completion, Completion::Stopped);
        assert_eq!(sink.into_primes().last(), Some(&1223));
        assert_eq!(progress.segments(), 2);
        assert_eq!(progress.sieved_to(), 1999);
    }

    /// Running one engine twice re-arms cursors and gives the same answer.
    #[test]
    fn engine_reuse_is_idempotent() {
        let mut sieve = SegmentSieve::new(128);
        let mut first = CollectUpTo::new(5000);
        sieve.run(5000, &mut first);
        let covered = sieve.small_primes().covered();
        let mut second = CollectUpTo::new(5000);
        sieve.run(5000, &mut second);
        assert_eq!(first.into_primes(), second.into_primes());
        assert_eq!(sieve.small_primes().covered(), covered);
    }

    // ── BitSieve ──────────────────────────────────────────────────

    fn set_bits(bs: &BitSieve) -> usize {
        (0..bs.len()).filter(|&i| bs.get(i)).count()
    }

    #[test]
    fn bitsieve_new_all_set() {
        let bs = BitSieve::new_all_set(100);
        assert_eq!(bs.len(), 100);
        assert!(!bs.is_empty());
        for i in 0..100 {
            assert!(bs.get(i), "bit {} should be set", i);
        }
        assert!(BitSieve::new_all_set(0).is_empty());
    }

    #[test]
    fn bitsieve_clear_is_per_bit() {
        let mut bs = BitSieve::new_all_set(200);
        for i in [0, 63, 64, 199] {
            bs.clear(i);
        }
        assert!(!bs.get(0) && !bs.get(63) && !bs.get(64) && !bs.get(199));
        assert!(bs.get(1) && bs.get(62) && bs.get(65) && bs.get(198));
        assert_eq!(set_bits(&bs), 196);
    }

    /// Reset after striking restores every bit.
    #[test]
    fn bitsieve_fill_restores_survivors() {
        let mut bs = BitSieve::new_all_set(130);
        for i in (0..130).step_by(3) {
            bs.clear(i);
        }
        assert_eq!(set_bits(&bs), 130 - 44);
        bs.fill();
        assert_eq!(set_bits(&bs), 130);
    }

    /// Growing across a partial last word must set the reopened bits and
    /// keep existing cleared bits cleared.
    #[test]
    fn bitsieve_grow_preserves_and_sets() {
        let mut bs = BitSieve::new_all_set(70);
        bs.clear(3);
        bs.clear(69);
        bs.grow(200);
        assert_eq!(bs.len(), 200);
        assert!(!bs.get(3) && !bs.get(69));
        assert!((70..200).all(|i| bs.get(i)));
        assert_eq!(set_bits(&bs), 198);
        bs.grow(100);
        assert_eq!(bs.len(), 200, "grow never shrinks");
    }

    #[test]
    fn bitsieve_grow_within_last_word() {
        let mut bs = BitSieve::new_all_set(10);
        bs.clear(3);
        bs.grow(20);
        assert!(!bs.get(3));
        assert!((10..20).all(|i| bs.get(i)));
        assert_eq!(set_bits(&bs), 19);
    }

    #[test]
    fn bitsieve_grow_from_empty_and_word_aligned() {
        let mut bs = BitSieve::new_all_set(0);
        bs.grow(64);
        assert_eq!(set_bits(&bs), 64);
        bs.clear(10);
        bs.grow(129);
        assert_eq!(set_bits(&bs), 128);
        assert!(bs.get(128));
    }
}
