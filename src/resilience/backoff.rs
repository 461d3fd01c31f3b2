//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

/// Jitter is drawn from `[0, delay / JITTER_DIVISOR)`.
const JITTER_DIVISOR: u64 = 10;

/// Delay schedule `base, 2*base, 4*base, ...`, capped at `max`.
///
/// A zero base disables waiting entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    pub fn is_disabled(&self) -> bool {
        self.base_ms == 0
    }

    /// Delay after `failed_attempts` failures, before jitter.
    pub fn nominal(&self, failed_attempts: u32) -> Duration {
        if failed_attempts == 0 || self.is_disabled() {
            return Duration::ZERO;
        }
        let factor = 1u64.checked_shl(failed_attempts - 1).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_ms.saturating_mul(factor).min(self.max_ms))
    }

    /// Nominal delay plus jitter drawn from `rng`.
    pub fn delay_with<R: Rng + ?Sized>(&self, failed_attempts: u32, rng: &mut R) -> Duration {
        let nominal = self.nominal(failed_attempts);
        let spread = nominal.as_millis() as u64 / JITTER_DIVISOR;
        if spread == 0 {
            return nominal;
        }
        nominal + Duration::from_millis(rng.gen_range(0..spread))
    }

    /// Nominal delay plus jitter from the thread-local generator.
    pub fn delay(&self, failed_attempts: u32) -> Duration {
        self.delay_with(failed_attempts, &mut rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_nominal_doubles_until_cap() {
        let backoff = Backoff::new(100, 1000);
        let delays: Vec<_> = (1..=6).map(|n| backoff.nominal(n).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1000, 1000]);
    }

    #[test]
    fn test_huge_attempt_count_saturates_at_cap() {
        let backoff = Backoff::new(100, 2000);
        assert_eq!(backoff.nominal(200), Duration::from_millis(2000));
    }

    #[test]
    fn test_jitter_stays_within_a_tenth() {
        let backoff = Backoff::new(100, 2000);
        let mut rng = StdRng::seed_from_u64(7);
        for failed in 1..8 {
            let nominal = backoff.nominal(failed);
            let delay = backoff.delay_with(failed, &mut rng);
            assert!(delay >= nominal);
            assert!(delay < nominal + nominal / 10);
        }
    }

    #[test]
    fn test_zero_base_disables_backoff() {
        let backoff = Backoff::new(0, 2000);
        assert!(backoff.is_disabled());
        assert_eq!(backoff.delay(5), Duration::ZERO);
        assert_eq!(Backoff::new(100, 2000).delay(0), Duration::ZERO);
    }
}
