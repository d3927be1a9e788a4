use std::fmt;
use std::time::Duration;

/// Readiness conventions, listed in the order they are tried.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ProbeKind {
    /// NIM-style `GET /health/ready`.
    HealthReady,
    /// OpenAI-style `GET /models`.
    Models,
}

impl ProbeKind {
    pub const DEFAULT_ORDER: [ProbeKind; 2] = [ProbeKind::HealthReady, ProbeKind::Models];

    pub fn path(&self) -> &'static str {
        match self {
            ProbeKind::HealthReady => "/health/ready",
            ProbeKind::Models => "/models",
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            ProbeKind::HealthReady => "health",
            ProbeKind::Models => "models",
        }
    }

    /// Advisory probes may not exist on the server at all, so their failures
    /// are logged but never shown to the user.
    pub fn is_advisory(&self) -> bool {
        matches!(self, ProbeKind::HealthReady)
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready {
        probe: ProbeKind,
        attempts: u32,
        elapsed: Duration,
    },
    TimedOut {
        attempts: u32,
        elapsed: Duration,
    },
}

impl WaitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            WaitOutcome::Ready { attempts, .. } | WaitOutcome::TimedOut { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            WaitOutcome::Ready { elapsed, .. } | WaitOutcome::TimedOut { elapsed, .. } => *elapsed,
        }
    }
}
