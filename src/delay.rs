//! Async delay.
//!
//! Thin wrapper over `tokio::time::sleep` that returns without yielding for
//! non-positive durations. There is no cancellation path beyond dropping the
//! future.

use std::time::Duration;

/// Suspend the current task for at least `duration`.
///
/// A zero duration completes on the first poll.
pub async fn delay(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    tokio::time::sleep(duration).await;
}

/// Suspend the current task for at least `ms` milliseconds. `ms <= 0`
/// completes on the first poll.
pub async fn delay_ms(ms: i64) {
    if ms <= 0 {
        return;
    }
    delay(Duration::from_millis(ms.unsigned_abs())).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Instant, timeout};

    #[tokio::test]
    async fn non_positive_completes_on_first_poll() {
        // A zero timeout still polls the inner future once before expiring.
        assert!(timeout(Duration::ZERO, delay_ms(0)).await.is_ok());
        assert!(timeout(Duration::ZERO, delay_ms(-5)).await.is_ok());
        assert!(timeout(Duration::ZERO, delay(Duration::ZERO)).await.is_ok());
    }

    #[tokio::test]
    async fn positive_does_not_complete_on_first_poll() {
        assert!(timeout(Duration::ZERO, delay_ms(50)).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_at_least_requested() {
        let start = Instant::now();
        delay_ms(50).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_does_not_advance_clock() {
        let start = Instant::now();
        delay_ms(0).await;
        delay_ms(-5).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn real_clock_resumes() {
        let start = std::time::Instant::now();
        delay(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
