//! # Jitter policy for retry delays.
//!
//! [`JitterPolicy`] adds randomness to backoff delays so that many retry
//! loops failing at once do not wake up in lockstep.
//!
//! - [`JitterPolicy::None`] no randomization, predictable delays
//! - [`JitterPolicy::Full`] random delay in [0, delay]
//! - [`JitterPolicy::Equal`] delay/2 + random[0, delay/2]
//! - [`JitterPolicy::Decorrelated`] random[base, prev × 3], capped at max
//!
//! The random source is always supplied by the caller, so a seeded
//! [`StdRng`](rand::rngs::StdRng) makes every delay reproducible.

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of retry delays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    #[default]
    None,

    /// Full jitter: random delay in [0, delay].
    Full,

    /// Equal jitter: delay/2 + random[0, delay/2].
    ///
    /// Keeps roughly 75% of the original backoff on average.
    Equal,

    /// Decorrelated jitter: random[base, prev × 3], capped at max.
    ///
    /// Needs extra context, see [`apply_decorrelated`](Self::apply_decorrelated).
    Decorrelated,
}

impl JitterPolicy {
    /// Applies jitter to `delay` using `rng`.
    ///
    /// For `Decorrelated` the input is returned unchanged.
    pub fn apply<R: Rng + ?Sized>(&self, delay: Duration, rng: &mut R) -> Duration {
        match self {
            JitterPolicy::None | JitterPolicy::Decorrelated => delay,
            JitterPolicy::Full => full_jitter(delay, rng),
            JitterPolicy::Equal => equal_jitter(delay, rng),
        }
    }

    /// Applies decorrelated jitter with full context.
    ///
    /// On any other policy this falls back to `apply(prev)`.
    pub fn apply_decorrelated<R: Rng + ?Sized>(
        &self,
        base: Duration,
        prev: Duration,
        max: Duration,
        rng: &mut R,
    ) -> Duration {
        if !matches!(self, JitterPolicy::Decorrelated) {
            return self.apply(prev, rng);
        }
        let base_ms = base.as_millis() as u64;
        let prev_ms = prev.as_millis() as u64;
        let max_ms = max.as_millis() as u64;

        let upper = prev_ms.saturating_mul(3).min(max_ms).max(base_ms);
        if base_ms >= upper {
            return base;
        }
        Duration::from_millis(rng.random_range(base_ms..=upper))
    }
}

fn full_jitter<R: Rng + ?Sized>(delay: Duration, rng: &mut R) -> Duration {
    let ms = delay.as_millis() as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rng.random_range(0..=ms))
}

fn equal_jitter<R: Rng + ?Sized>(delay: Duration, rng: &mut R) -> Duration {
    let ms = delay.as_millis() as u64;
    if ms == 0 {
        return Duration::ZERO;
    }
    let half = ms / 2;
    let jitter = if half == 0 {
        0
    } else {
        rng.random_range(0..=half)
    };
    Duration::from_millis(half + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_same_seed_same_delays() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let d = Duration::from_millis(1000);
            assert_eq!(
                JitterPolicy::Full.apply(d, &mut a),
                JitterPolicy::Full.apply(d, &mut b)
            );
        }
    }

    #[test]
    fn test_zero_delay_stays_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(JitterPolicy::Full.apply(Duration::ZERO, &mut rng), Duration::ZERO);
        assert_eq!(JitterPolicy::Equal.apply(Duration::ZERO, &mut rng), Duration::ZERO);
    }

    #[test]
    fn test_decorrelated_floor_at_base() {
        let mut rng = StdRng::seed_from_u64(3);
        let d = JitterPolicy::Decorrelated.apply_decorrelated(
            Duration::from_millis(500),
            Duration::from_millis(100),
            Duration::from_secs(1),
            &mut rng,
        );
        assert_eq!(d, Duration::from_millis(500));
    }
}
