//! # Pause between retry attempts.
//!
//! [`BackoffPolicy`] answers one question for the retry loop: after `n` failed
//! attempts, how long to wait before the next one.
//!
//! ```text
//! failures:  1          2                 3                  ...
//! pause:     interval   interval×growth   interval×growth²   (≤ ceiling)
//!            └─► jitter ─► min(remaining time on the deadline)
//! ```
//!
//! `growth = 1.0` (the [`fixed`](BackoffPolicy::fixed) policy) keeps every
//! pause at `interval`. A pause never outlives the deadline it runs under, so
//! the loop wakes no later than the moment the deadline fires.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use corral::BackoffPolicy;
//!
//! let policy = BackoffPolicy::exponential(Duration::from_millis(50), 2.0, Duration::from_secs(1));
//! let mut rng = StdRng::seed_from_u64(0);
//!
//! assert_eq!(policy.pause_after(1, None, &mut rng), Duration::from_millis(50));
//! assert_eq!(policy.pause_after(3, None, &mut rng), Duration::from_millis(200));
//! // 150ms left on the deadline caps the 200ms pause.
//! assert_eq!(
//!     policy.pause_after(3, Some(Duration::from_millis(150)), &mut rng),
//!     Duration::from_millis(150)
//! );
//! ```

use std::time::Duration;

use rand::Rng;

use crate::policies::jitter::JitterPolicy;

/// How long the retry loop waits after a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Pause after the first failure.
    pub interval: Duration,
    /// Multiplier per further failure; values below `1.0` behave as `1.0`.
    pub growth: f64,
    /// No single pause is longer than this.
    pub ceiling: Duration,
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// A fixed 100ms pause without jitter.
    fn default() -> Self {
        Self::fixed(Duration::from_millis(100))
    }
}

impl BackoffPolicy {
    /// The same `interval` after every failure.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            growth: 1.0,
            ceiling: interval,
            jitter: JitterPolicy::None,
        }
    }

    /// Starts at `interval` and multiplies by `growth` per failure, up to `ceiling`.
    pub fn exponential(interval: Duration, growth: f64, ceiling: Duration) -> Self {
        Self {
            interval,
            growth,
            ceiling,
            jitter: JitterPolicy::None,
        }
    }

    /// Replaces the jitter applied to each pause.
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Pause to take after `failures` failed attempts (`0` counts as `1`).
    ///
    /// Jitter draws from `rng`. With `remaining` set, the result is clamped
    /// to it.
    pub fn pause_after<R: Rng + ?Sized>(
        &self,
        failures: u32,
        remaining: Option<Duration>,
        rng: &mut R,
    ) -> Duration {
        let base = self.base(failures.saturating_sub(1));
        let pause = match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.interval.min(self.ceiling), base, self.ceiling, rng)
            }
            _ => self.jitter.apply(base, rng),
        };
        match remaining {
            Some(left) => pause.min(left),
            None => pause,
        }
    }

    fn base(&self, step: u32) -> Duration {
        let growth = self.growth.max(1.0);
        let exp = step.min(i32::MAX as u32) as i32;
        let secs = self.interval.as_secs_f64() * growth.powi(exp);
        if secs.is_finite() && secs < self.ceiling.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.ceiling
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_fixed_pause_ignores_failure_count() {
        let mut r = rng();
        let policy = BackoffPolicy::fixed(Duration::from_millis(300));
        for failures in [0, 1, 2, 50, u32::MAX] {
            assert_eq!(policy.pause_after(failures, None, &mut r), Duration::from_millis(300));
        }
    }

    #[test]
    fn test_pause_never_outlives_deadline() {
        let mut r = rng();
        let policy = BackoffPolicy::fixed(Duration::from_millis(300));
        let left = Some(Duration::from_millis(120));
        assert_eq!(policy.pause_after(4, left, &mut r), Duration::from_millis(120));
        assert_eq!(policy.pause_after(4, Some(Duration::ZERO), &mut r), Duration::ZERO);
    }

    #[test]
    fn test_first_failure_waits_one_interval() {
        let mut r = rng();
        let policy = BackoffPolicy::exponential(Duration::from_millis(100), 2.0, Duration::from_secs(1));
        let pauses: Vec<_> = (1..=5).map(|n| policy.pause_after(n, None, &mut r)).collect();
        assert_eq!(
            pauses,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
                Duration::from_secs(1),
            ]
        );
        assert_eq!(policy.pause_after(0, None, &mut r), Duration::from_millis(100));
    }

    #[test]
    fn test_runaway_growth_stops_at_ceiling() {
        let mut r = rng();
        let policy = BackoffPolicy::exponential(Duration::from_millis(10), 10.0, Duration::from_secs(2));
        assert_eq!(policy.pause_after(u32::MAX, None, &mut r), Duration::from_secs(2));
    }

    #[test]
    fn test_shrinking_growth_behaves_as_fixed() {
        let mut r = rng();
        let policy = BackoffPolicy::exponential(Duration::from_millis(80), 0.5, Duration::from_secs(1));
        assert_eq!(policy.pause_after(6, None, &mut r), Duration::from_millis(80));
    }

    #[test]
    fn test_jittered_pause_stays_within_base_and_deadline() {
        let mut r = rng();
        let policy = BackoffPolicy::fixed(Duration::from_millis(400)).with_jitter(JitterPolicy::Equal);
        for failures in 1..40 {
            let pause = policy.pause_after(failures, Some(Duration::from_millis(350)), &mut r);
            assert!(pause >= Duration::from_millis(200), "{pause:?}");
            assert!(pause <= Duration::from_millis(350), "{pause:?}");
        }
    }

    #[test]
    fn test_same_seed_same_pauses() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(50), 2.0, Duration::from_secs(5))
            .with_jitter(JitterPolicy::Full);
        let sample = |seed| {
            let mut r = StdRng::seed_from_u64(seed);
            (1..10)
                .map(|n| policy.pause_after(n, None, &mut r))
                .collect::<Vec<_>>()
        };
        assert_eq!(sample(7), sample(7));
    }
}
