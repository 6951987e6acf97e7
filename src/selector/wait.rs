//! Bounded polling
//!
//! Used for every "wait until present / enabled" need: waiting for a chain to
//! appear, and waiting for a disabled control to become clickable.

use std::future::Future;
use std::time::Duration;

/// Re-runs `probe` every `interval` until it yields a value or `attempts` are spent
///
/// A boolean condition is expressed as a probe returning `Option<()>`.
///
/// # Arguments
///
/// * `attempts` - Maximum number of probe runs (at least one run always happens)
/// * `interval` - Delay between consecutive runs
/// * `probe` - Async check; `Some` ends the poll
///
/// # Returns
///
/// * `Some(T)` - The first value the probe produced
/// * `None` - The attempt budget was exhausted
pub async fn poll_until<T, F, Fut>(attempts: u32, interval: Duration, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        if let Some(value) = probe().await {
            return Some(value);
        }
        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }
    None
}

/// Number of checks at `interval` that fit in `timeout` (at least one)
pub fn attempts_within(timeout: Duration, interval: Duration) -> u32 {
    if interval.is_zero() {
        return 1;
    }
    let n = timeout.as_millis() / interval.as_millis().max(1);
    u32::try_from(n).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_succeeds_midway() {
        let calls = &AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result = poll_until(10, Duration::from_secs(1), || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            (n == 3).then_some(n)
        })
        .await;

        assert_eq!(result, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_exhausts_budget() {
        let calls = &AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result: Option<()> = poll_until(10, Duration::from_secs(1), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            None
        })
        .await;

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        // No sleep after the final attempt
        assert_eq!(start.elapsed(), Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_probes_once() {
        let calls = &AtomicU32::new(0);
        let _: Option<()> = poll_until(0, Duration::from_secs(1), || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            None
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_attempts_within() {
        assert_eq!(attempts_within(Duration::from_secs(5), Duration::from_millis(500)), 10);
        assert_eq!(attempts_within(Duration::from_millis(100), Duration::from_secs(1)), 1);
        assert_eq!(attempts_within(Duration::from_secs(5), Duration::ZERO), 1);
    }
}
