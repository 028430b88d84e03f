//! Retry policy for remote embedding calls

use std::time::Duration;

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of physical attempts, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt
    pub base_delay: Duration,

    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Policy that never waits between attempts (tests, offline tools)
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay to wait before the given 1-based attempt.
    ///
    /// The first attempt never waits; after that the delay doubles from
    /// `base_delay` and is capped at `max_delay`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exp = (attempt - 2).min(31);
        let factor = 2u32.saturating_pow(exp);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Attempts allowed, never less than one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts(), 3);
        assert_eq!(policy.delay_before(1), Duration::ZERO);
        assert_eq!(policy.delay_before(2), Duration::from_secs(1));
        assert_eq!(policy.delay_before(3), Duration::from_secs(2));
        assert_eq!(policy.delay_before(4), Duration::from_secs(4));
        assert_eq!(policy.delay_before(5), Duration::from_secs(8));
        assert_eq!(policy.delay_before(6), Duration::from_secs(10));
        assert_eq!(policy.delay_before(40), Duration::from_secs(10));
    }

    #[test]
    fn test_immediate_policy() {
        let policy = RetryPolicy::immediate(0);
        assert_eq!(policy.attempts(), 1);
        assert_eq!(policy.delay_before(3), Duration::ZERO);
    }
}
