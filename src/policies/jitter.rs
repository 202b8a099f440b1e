//! # Jitter policy for poll retry delays.
//!
//! Every worker of a test run polls the same coordination service. When that
//! service drops out, all workers start failing at the same instant; without
//! jitter they would also retry at the same instant.
//!
//! - [`JitterPolicy::None`]: exact delays
//! - [`JitterPolicy::Full`]: random delay in [0, delay]
//! - [`JitterPolicy::Equal`]: delay/2 + random[0, delay/2]

use rand::Rng;
use std::time::Duration;

/// Randomization applied to a computed backoff delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    #[default]
    None,

    /// Full jitter: random delay in [0, delay].
    ///
    /// Can retry almost immediately; spreads load the most.
    Full,

    /// Equal jitter: delay/2 + random[0, delay/2].
    ///
    /// Keeps at least half of the computed delay.
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to the given delay.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                let extra = if half == 0 {
                    0
                } else {
                    rand::rng().random_range(0..=half)
                };
                Duration::from_millis(half + extra)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let d = Duration::from_millis(1234);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn test_zero_stays_zero() {
        for j in [JitterPolicy::None, JitterPolicy::Full, JitterPolicy::Equal] {
            assert_eq!(j.apply(Duration::ZERO), Duration::ZERO);
        }
    }

    #[test]
    fn test_equal_keeps_half() {
        for _ in 0..100 {
            let d = JitterPolicy::Equal.apply(Duration::from_millis(800));
            assert!(d >= Duration::from_millis(400), "{d:?}");
            assert!(d <= Duration::from_millis(800), "{d:?}");
        }
    }
}
