//! # Bootstrap — Self-Extending Small-Prime Sieve
//!
//! Supplies the sieving primes for the segment sieve. Keeps a flat sieve of
//! Eratosthenes over `[0, covered)` that only ever grows upward: when a
//! larger square-root bound is requested the array is extended, the new
//! range is backfilled using the primes already known, and the survivors of
//! the new range are appended to the prime list. Nothing below the old
//! boundary is ever re-sieved.
//!
//! Each small prime carries a **next-composite cursor**: the offset, within
//! the segment about to be processed, of the next odd multiple of that prime
//! still to be struck. Cursors are armed once per enumeration run and then
//! rebased by the segment sieve (subtract the segment length) rather than
//! recomputed, which keeps total marking work at O(n log log n).
//!
//! Coverage is capped at [`SQRT_CEILING`] = 2^32, so every sieving prime
//! fits in a `u32` and its square fits in a `u64`.

use crate::sieve::BitSieve;
use tracing::debug;

/// Growth granularity of the composite array, to amortize reallocation.
pub const MIN_GROWTH: u64 = 1024;

/// The bootstrap never covers integers at or above this value.
pub const SQRT_CEILING: u64 = 1 << 32;

/// Growable small-prime table with per-prime segment cursors.
pub struct SmallPrimes {
    /// Bit `i` set means `i` has not been struck (prime, for `i >= 2`).
    survivors: BitSieve,
    primes: Vec<u32>,
    cursors: Vec<u64>,
    /// `primes[..armed]` have cursors valid for the current run.
    armed: usize,
}

impl Default for SmallPrimes {
    fn default() -> Self {
        Self::new()
    }
}

impl SmallPrimes {
    pub fn new() -> Self {
        SmallPrimes {
            survivors: BitSieve::new_all_set(0),
            primes: Vec::new(),
            cursors: Vec::new(),
            armed: 0,
        }
    }

    /// Every prime below this value is in [`SmallPrimes::primes`].
    #[inline]
    pub fn covered(&self) -> u64 {
        self.survivors.len() as u64
    }

    /// All small primes discovered so far, ascending.
    #[inline]
    pub fn primes(&self) -> &[u32] {
        &self.primes
    }

    /// Make sure every prime `<= bound` is known and has a cursor positioned
    /// for the segment starting at `low`. Returns the known primes.
    ///
    /// A no-op beyond a length check when the array already covers `bound`
    /// and every prime is armed. Bounds past [`SQRT_CEILING`] are clamped.
    pub fn ensure_sieved_to(&mut self, bound: u64, low: u64) -> &[u32] {
        let wanted = bound.saturating_add(1).min(SQRT_CEILING);
        if wanted > self.covered() {
            self.grow(wanted);
        }
        if self.armed < self.primes.len() {
            self.arm(low);
        }
        &self.primes
    }

    /// Forget all cursors so the next [`ensure_sieved_to`] re-arms them for a
    /// fresh run. The prime table itself is kept.
    ///
    /// [`ensure_sieved_to`]: SmallPrimes::ensure_sieved_to
    pub fn disarm(&mut self) {
        self.armed = 0;
        self.cursors.clear();
    }

    /// Odd sieving primes with their cursors, in ascending order.
    ///
    /// 2 is never yielded: only odd candidates are ever tested, so the
    /// segment sieve strikes odd multiples only.
    pub fn sieving_mut(&mut self) -> impl Iterator<Item = (u64, &mut u64)> + '_ {
        self.primes[..self.armed]
            .iter()
            .zip(self.cursors.iter_mut())
            .skip(1)
            .map(|(&p, cursor)| (p as u64, cursor))
    }

    fn grow(&mut self, wanted: u64) {
        let old = self.covered();
        let new = wanted.max(old + MIN_GROWTH).min(SQRT_CEILING);
        self.survivors.grow(new as usize);
        if old == 0 {
            self.survivors.clear(0);
            self.survivors.clear(1);
        }

        // Backfill the new range with primes we already know.
        for &p in &self.primes {
            let p = p as u64;
            let square = p * p;
            if square >= new {
                break;
            }
            let first = square.max(old.div_ceil(p) * p);
            strike(&mut self.survivors, first, p, new);
        }

        // Survivors of the new range are new primes; strike their multiples
        // before the scan reaches them.
        let before = self.primes.len();
        for i in old.max(2)..new {
            if !self.survivors.get(i as usize) {
                continue;
            }
            self.primes.push(i as u32);
            let square = i * i;
            if square < new {
                strike(&mut self.survivors, square, i, new);
            }
        }

        debug!(
            old_covered = old,
            covered = new,
            discovered = self.primes.len() - before,
            small_primes = self.primes.len(),
            "bootstrap grew"
        );
    }

    /// Position cursors of not-yet-armed primes at their first odd multiple
    /// `>= max(p², low)`, relative to `low`.
    fn arm(&mut self, low: u64) {
        for &p in &self.primes[self.armed..] {
            let p = p as u64;
            let mut first = (p * p).max(low.div_ceil(p) * p);
            if first % 2 == 0 {
                first += p;
            }
            self.cursors.push(first - low);
        }
        self.armed = self.primes.len();
    }
}

/// Clear every `step`-th bit of `bits` from `first` up to (excluding) `end`.
#[inline]
fn strike(bits: &mut BitSieve, first: u64, step: u64, end: u64) {
    let mut m = first;
    while m < end {
        bits.clear(m as usize);
        m += step;
    }
}
