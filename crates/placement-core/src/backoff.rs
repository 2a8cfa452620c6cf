//! Rate-limit countdown
//!
//! A single timer drives both the visible countdown and the retry gate: the
//! caller retries only when `run` returns `Elapsed`, which happens on the same
//! tick that reports zero remaining time.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::PortalConfig;

/// How a countdown ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    Elapsed,
    Cancelled,
}

/// Fixed-interval countdown with a fixed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    interval: Duration,
    tick: Duration,
}

impl Countdown {
    /// A zero tick is bumped to one millisecond so the loop always advances.
    pub fn new(interval: Duration, tick: Duration) -> Self {
        Self {
            interval,
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    pub fn from_config(config: &PortalConfig) -> Self {
        Self::new(config.retry_interval(), config.tick())
    }

    /// Number of ticks until zero; the last tick may be shorter
    pub fn ticks(&self) -> u32 {
        let interval = self.interval.as_millis();
        let tick = self.tick.as_millis();
        u32::try_from(interval.div_ceil(tick)).unwrap_or(u32::MAX)
    }

    /// Count down from the full interval.
    ///
    /// `on_tick` sees the full interval first, then the remaining time after
    /// every tick, ending with zero.
    pub async fn run<F>(&self, cancel: &CancellationToken, mut on_tick: F) -> CountdownOutcome
    where
        F: FnMut(Duration),
    {
        let mut remaining = self.interval;
        on_tick(remaining);

        while !remaining.is_zero() {
            let step = self.tick.min(remaining);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return CountdownOutcome::Cancelled,
                _ = sleep(step) => {}
            }
            remaining = remaining.saturating_sub(step);
            on_tick(remaining);
        }

        CountdownOutcome::Elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn counts_down_in_fixed_ticks() {
        let countdown = Countdown::new(Duration::from_millis(10_000), Duration::from_millis(1_000));
        let cancel = CancellationToken::new();
        let start = Instant::now();
        let mut seen = Vec::new();

        let outcome = countdown
            .run(&cancel, |remaining| seen.push(remaining.as_millis() as u64))
            .await;

        assert_eq!(outcome, CountdownOutcome::Elapsed);
        assert_eq!(
            seen,
            [10_000, 9_000, 8_000, 7_000, 6_000, 5_000, 4_000, 3_000, 2_000, 1_000, 0]
        );
        assert_eq!(countdown.ticks(), 10);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn last_tick_covers_the_remainder() {
        let countdown = Countdown::new(Duration::from_millis(2_500), Duration::from_millis(1_000));
        let mut seen = Vec::new();

        countdown
            .run(&CancellationToken::new(), |remaining| {
                seen.push(remaining.as_millis() as u64)
            })
            .await;

        assert_eq!(seen, [2_500, 1_500, 500, 0]);
        assert_eq!(countdown.ticks(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_before_zero() {
        let countdown = Countdown::new(Duration::from_secs(10), Duration::from_secs(1));
        let cancel = CancellationToken::new();
        let mut seen = Vec::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(3_500)).await;
            canceller.cancel();
        });

        let outcome = countdown
            .run(&cancel, |remaining| seen.push(remaining.as_millis() as u64))
            .await;

        assert_eq!(outcome, CountdownOutcome::Cancelled);
        assert_eq!(seen, [10_000, 9_000, 8_000, 7_000]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_elapses_immediately() {
        let countdown = Countdown::new(Duration::ZERO, Duration::from_secs(1));
        let mut seen = Vec::new();

        let outcome = countdown
            .run(&CancellationToken::new(), |remaining| {
                seen.push(remaining.as_millis() as u64)
            })
            .await;

        assert_eq!(outcome, CountdownOutcome::Elapsed);
        assert_eq!(seen, [0]);
        assert_eq!(countdown.ticks(), 0);
    }

    #[test]
    fn tick_count_saturates_for_huge_intervals() {
        let countdown = Countdown::new(Duration::from_secs(u64::MAX), Duration::from_millis(1));
        assert_eq!(countdown.ticks(), u32::MAX);
    }
}
