use std::time::Duration;

pub const GROWTH_FACTOR: f64 = 1.5;

/// Interval growth state for one poll session.
#[derive(Clone, Debug)]
pub struct Backoff {
    current: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            current: initial.min(max),
            max,
        }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    /// Sleep before the next check; jitter never lifts it above the ceiling.
    pub fn sleep_for(&self, jitter: Duration) -> Duration {
        self.current.saturating_add(jitter).min(self.max)
    }

    pub fn grow(&mut self) {
        self.current = scale_interval(self.current, self.max);
    }
}

/// Closed form of the interval used on the `attempt`-th cycle (1-based).
pub fn interval_for_attempt(initial: Duration, attempt: u32, max: Duration) -> Duration {
    let exp = f64::from(attempt.saturating_sub(1));
    let secs = initial.as_secs_f64() * GROWTH_FACTOR.powf(exp);
    Duration::try_from_secs_f64(secs)
        .unwrap_or(max)
        .min(max)
}

fn scale_interval(current: Duration, max: Duration) -> Duration {
    Duration::try_from_secs_f64(current.as_secs_f64() * GROWTH_FACTOR)
        .unwrap_or(max)
        .min(max)
}
