use crate::backoff::Backoff;
use crate::config::WaitConfig;
use std::time::{Duration, Instant};

/// State of one wait, from start to success or timeout.
#[derive(Debug)]
pub struct PollSession {
    start: Instant,
    deadline: Option<Instant>,
    backoff: Backoff,
    attempts: u32,
}

impl PollSession {
    pub fn start(config: &WaitConfig, now: Instant) -> Self {
        Self {
            start: now,
            // None when the deadline cannot be represented, which never arrives.
            deadline: now.checked_add(config.timeout),
            backoff: Backoff::new(config.initial_interval, config.max_backoff),
            attempts: 0,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    pub fn current_interval(&self) -> Duration {
        self.backoff.current()
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    pub fn backoff_mut(&mut self) -> &mut Backoff {
        &mut self.backoff
    }
}
