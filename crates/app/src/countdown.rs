//! Post-restart countdown.
//!
//! After the charger accepts a restart the client counts down from a fixed
//! value, one step per period, and reloads when it reaches zero. The timer is
//! purely local: it does not probe whether the charger actually came back.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

/// Seconds the original UI waits before reloading after a restart.
pub const RESTART_COUNTDOWN_SECS: u32 = 10;

/// A fixed countdown `from, from - 1, …, 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    from: u32,
    period: Duration,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(RESTART_COUNTDOWN_SECS, Duration::from_secs(1))
    }
}

impl Countdown {
    /// Count down from `from` to zero, one step every `period`.
    #[must_use]
    pub fn new(from: u32, period: Duration) -> Self {
        Self { from, period }
    }

    /// Starting value.
    #[must_use]
    pub fn start_value(self) -> u32 {
        self.from
    }

    /// Total time from start to the terminal step.
    #[must_use]
    pub fn total(self) -> Duration {
        self.period * self.from
    }

    /// Run to completion, calling `on_step` with every value.
    ///
    /// The starting value is reported immediately, then one value per
    /// period. Returns once `0` has been reported.
    pub async fn run(self, mut on_step: impl FnMut(u32) + Send) {
        on_step(self.from);
        if self.from == 0 {
            return;
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        for remaining in (0..self.from).rev() {
            ticker.tick().await;
            on_step(remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn should_count_down_from_ten_to_zero() {
        let mut steps = Vec::new();
        Countdown::default().run(|n| steps.push(n)).await;

        assert_eq!(steps, vec![10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_take_one_period_per_step() {
        let start = Instant::now();
        Countdown::new(3, Duration::from_secs(1)).run(|_| {}).await;

        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn should_strictly_decrease_by_one() {
        let mut steps = Vec::new();
        Countdown::new(5, Duration::from_millis(200))
            .run(|n| steps.push(n))
            .await;

        for pair in steps.windows(2) {
            assert_eq!(pair[0], pair[1] + 1);
        }
        assert_eq!(steps.last(), Some(&0));
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_zero_immediately_when_starting_at_zero() {
        let start = Instant::now();
        let mut steps = Vec::new();
        Countdown::new(0, Duration::from_secs(1))
            .run(|n| steps.push(n))
            .await;

        assert_eq!(steps, vec![0]);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn should_compute_total_duration() {
        assert_eq!(Countdown::default().total(), Duration::from_secs(10));
        assert_eq!(Countdown::default().start_value(), RESTART_COUNTDOWN_SECS);
    }
}
