//! # Wheel — Mod-210 Candidate Gaps
//!
//! Integers coprime to 210 = 2·3·5·7 recur with a fixed pattern of 48 gaps
//! per period. Stepping a candidate by these gaps, starting from 11, visits
//! exactly the integers with no factor in {2, 3, 5, 7}, so the hot loop of
//! the segment sieve never tests a multiple of the wheel primes and never
//! performs a per-candidate modulo.
//!
//! 2, 3, 5 and 7 themselves are emitted by the sieve before wheel stepping
//! begins; 11 is the wheel's first spoke.

/// Primes whose multiples the wheel skips.
pub const WHEEL_PRIMES: [u64; 4] = [2, 3, 5, 7];

/// The first candidate visited by the wheel.
pub const WHEEL_START: u64 = 11;

/// Product of the wheel primes; also the sum of [`GAPS`].
pub const WHEEL_PERIOD: u64 = 210;

/// Distances between consecutive integers ≥ 11 that are coprime to 210.
pub const GAPS: [u8; 48] = [
    2, 4, 2, 4, 6, 2, 6, 4, 2, 4, 6, 6, 2, 6, 4, 2, 6, 4, 6, 8, 4, 2, 4, 2, 4, 8, 6, 4, 6, 2, 4,
    6, 2, 6, 6, 4, 2, 4, 6, 2, 6, 4, 2, 4, 2, 10, 2, 10,
];

/// Return the gap at `cursor` and the cursor of the following gap.
///
/// The cursor wraps modulo the table length, so callers can step forever.
#[inline]
pub fn advance(cursor: usize) -> (u64, usize) {
    let gap = GAPS[cursor] as u64;
    let next = if cursor + 1 == GAPS.len() { 0 } else { cursor + 1 };
    (gap, next)
}

/// A candidate value paired with its position on the wheel.
///
/// Starts at [`WHEEL_START`]; each [`WheelCursor::step`] moves to the next
/// integer coprime to 210.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WheelCursor {
    pub value: u64,
    spoke: usize,
}

impl Default for WheelCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl WheelCursor {
    pub fn new() -> Self {
        WheelCursor {
            value: WHEEL_START,
            spoke: 0,
        }
    }

    #[inline]
    pub fn step(&mut self) {
        let (gap, spoke) = advance(self.spoke);
        self.value += gap;
        self.spoke = spoke;
    }
}
