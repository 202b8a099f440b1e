//! # Backoff policy for coordinator poll failures.
//!
//! [`BackoffPolicy`] controls how the pause between polls grows while the
//! coordination service keeps failing. It is parameterized by:
//! - [`BackoffPolicy::first`] the delay after the first failure;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the cap.
//!
//! The delay for failure `n` (0-indexed) is `first × factor^n`, clamped to `max`,
//! then jitter is applied. The base is derived from `n` alone, so jitter never
//! feeds back into the next delay.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use haltwatch::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(500),
//!     max: Duration::from_secs(5),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(500));
//! assert_eq!(backoff.next(1), Duration::from_secs(1));
//! assert_eq!(backoff.next(10), Duration::from_secs(5));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Poll retry backoff policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay after the first failure.
    pub first: Duration,
    /// Maximum delay between two polls.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a constant 500ms delay without jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(500),
            max: Duration::from_secs(5),
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay after the `failure`-th consecutive failure (0-indexed).
    ///
    /// Overflowing or non-finite intermediate values clamp to [`BackoffPolicy::max`].
    pub fn next(&self, failure: u32) -> Duration {
        let exp = failure.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(jitter: JitterPolicy) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter,
        }
    }

    #[test]
    fn test_first_failure_uses_first() {
        assert_eq!(policy(JitterPolicy::None).next(0), Duration::from_millis(100));
    }

    #[test]
    fn test_exponential_growth_no_jitter() {
        let p = policy(JitterPolicy::None);
        assert_eq!(p.next(1), Duration::from_millis(200));
        assert_eq!(p.next(2), Duration::from_millis(400));
        assert_eq!(p.next(3), Duration::from_millis(800));
    }

    #[test]
    fn test_default_is_constant() {
        let p = BackoffPolicy::default();
        for failure in 0..10 {
            assert_eq!(p.next(failure), Duration::from_millis(500));
        }
    }

    #[test]
    fn test_first_exceeds_max() {
        let p = BackoffPolicy {
            first: Duration::from_secs(10),
            max: Duration::from_secs(5),
            factor: 2.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(p.next(0), Duration::from_secs(5));
    }

    #[test]
    fn test_overflow_clamps_to_max() {
        let p = policy(JitterPolicy::None);
        assert_eq!(p.next(100), Duration::from_secs(30));
        assert_eq!(p.next(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_full_jitter_never_exceeds_base() {
        let p = policy(JitterPolicy::Full);
        for failure in 0..15 {
            let base = Duration::from_millis(
                (100.0 * 2.0f64.powi(failure as i32)).min(30_000.0) as u64,
            );
            assert!(p.next(failure) <= base, "failure {failure}");
        }
    }
}
