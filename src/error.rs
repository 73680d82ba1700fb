//! Error type for the enumeration engine.
//!
//! Domain and argument errors are precondition failures detected at the
//! call boundary, before any sieving begins. The only failure once sieving
//! has started is cancellation from another thread; bootstrap growth and
//! segment processing have no failure modes of their own.

/// Errors reported by query entry points and configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SieveError {
    /// The requested bound or ordinal lies beyond the `u64` domain the
    /// engine can sieve without overflowing its intermediates.
    #[error("{what} = {value} exceeds the supported domain (max {max})")]
    DomainExhausted {
        what: &'static str,
        value: u64,
        max: u64,
    },

    /// An argument outside the operation's contract (zero ordinal, bad
    /// segment size, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The run's [`Progress`](crate::progress::Progress) was cancelled
    /// before the answer was complete.
    #[error("enumeration cancelled before completion")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, SieveError>;
