//! Sliding-window rate limiter for remote provider calls
//!
//! Tracks the timestamps of physical calls made in the trailing window and
//! makes callers wait until one more call would stay under the ceiling. The
//! state is owned by the limiter value itself, so every service (and every
//! test) gets a fresh window.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Length of the accounting window
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Extra wait added once the oldest call leaves the window
const SAFETY_MARGIN: Duration = Duration::from_millis(50);

/// Limits calls to `max_calls` per trailing window
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: u32,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with a 60 second window. `max_calls == 0` disables it.
    pub fn new(max_calls: u32) -> Self {
        Self::with_window(max_calls, DEFAULT_WINDOW)
    }

    pub fn with_window(max_calls: u32, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_calls > 0
    }

    pub fn max_calls(&self) -> u32 {
        self.max_calls
    }

    /// Wait for a free slot and record a new call.
    ///
    /// Pruning, the ceiling check and recording happen under one lock, so two
    /// callers can never both take the last slot. The lock is released while
    /// sleeping.
    pub async fn acquire(&self, correlation_id: &str) {
        if !self.is_enabled() {
            return;
        }

        loop {
            let mut timestamps = self.timestamps.lock().await;
            let now = Instant::now();
            self.prune(&mut timestamps, now);

            if timestamps.len() < self.max_calls as usize {
                timestamps.push_back(now);
                debug!(
                    correlation_id,
                    in_window = timestamps.len(),
                    "rate limit slot acquired"
                );
                return;
            }

            // At the ceiling, so there is at least one timestamp
            let wait = match timestamps.front() {
                Some(oldest) => {
                    self.window.saturating_sub(now.duration_since(*oldest)) + SAFETY_MARGIN
                }
                None => SAFETY_MARGIN,
            };

            info!(
                correlation_id,
                wait_ms = wait.as_millis() as u64,
                "Throttling provider calls to respect quota"
            );

            drop(timestamps);
            tokio::time::sleep(wait).await;
        }
    }

    /// Number of calls recorded in the current window
    pub async fn in_window(&self) -> usize {
        let mut timestamps = self.timestamps.lock().await;
        self.prune(&mut timestamps, Instant::now());
        timestamps.len()
    }

    fn prune(&self, timestamps: &mut VecDeque<Instant>, now: Instant) {
        while let Some(oldest) = timestamps.front() {
            if now.duration_since(*oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_under_ceiling_does_not_wait() {
        let limiter = RateLimiter::new(3);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire("-").await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.in_window().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_ceiling_allocates_lazily() {
        let limiter = RateLimiter::new(u32::MAX);
        assert!(limiter.is_enabled());

        limiter.acquire("-").await;
        assert_eq!(limiter.in_window().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_limiter_never_blocks() {
        let limiter = RateLimiter::new(0);
        let start = Instant::now();

        for _ in 0..100 {
            limiter.acquire("-").await;
        }

        assert!(!limiter.is_enabled());
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.in_window().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_third_call_waits_for_window() {
        let limiter = RateLimiter::new(2);
        let start = Instant::now();

        limiter.acquire("first").await;
        tokio::time::advance(Duration::from_secs(5)).await;
        limiter.acquire("second").await;
        tokio::time::advance(Duration::from_secs(5)).await;
        limiter.acquire("third").await;

        // Third call proceeds only once the first has left the window
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(60), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(61), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_old_calls_are_pruned() {
        let limiter = RateLimiter::new(2);
        limiter.acquire("-").await;
        limiter.acquire("-").await;
        assert_eq!(limiter.in_window().await, 2);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(limiter.in_window().await, 0);

        let start = Instant::now();
        limiter.acquire("-").await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_respect_ceiling() {
        let limiter = Arc::new(RateLimiter::with_window(3, Duration::from_secs(10)));
        let start = Instant::now();

        let handles = (0..9)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    limiter.acquire("-").await;
                    Instant::now()
                })
            })
            .collect::<Vec<_>>();

        let mut times = Vec::new();
        for handle in handles {
            times.push(handle.await.unwrap());
        }
        times.sort();

        // No trailing 10s span holds more than 3 admitted calls
        for (i, t) in times.iter().enumerate() {
            let in_span = times[..=i]
                .iter()
                .filter(|earlier| t.duration_since(**earlier) < Duration::from_secs(10))
                .count();
            assert!(in_span <= 3, "window overflow at call {i}");
        }

        // Nine calls at three per window need at least two full windows
        assert!(start.elapsed() >= Duration::from_secs(20));
    }
}
