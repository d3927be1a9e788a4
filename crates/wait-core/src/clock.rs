use rand::Rng;
use std::thread;
use std::time::{Duration, Instant};

/// Time source for the poller. Sleeping goes through the clock so tests can
/// advance virtual time instead of blocking.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Random addition to each backoff sleep.
pub trait Jitter {
    /// Returns a duration in `[0, max]`.
    fn sample(&mut self, max: Duration) -> Duration;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngJitter;

impl Jitter for ThreadRngJitter {
    fn sample(&mut self, max: Duration) -> Duration {
        if max.is_zero() {
            return Duration::ZERO;
        }
        let secs = rand::thread_rng().gen_range(0.0..=max.as_secs_f64());
        Duration::from_secs_f64(secs).min(max)
    }
}

/// Always returns the same jitter, clamped to the requested maximum.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedJitter(pub Duration);

impl Jitter for FixedJitter {
    fn sample(&mut self, max: Duration) -> Duration {
        self.0.min(max)
    }
}
