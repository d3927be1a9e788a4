use crate::model::ProbeKind;
use std::io::Write;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    Started {
        timeout: Duration,
    },
    ProbeFailed {
        probe: ProbeKind,
        error: String,
    },
    Ready {
        probe: ProbeKind,
    },
    Sleeping {
        elapsed: Duration,
        next_check: Duration,
    },
    TimedOut {
        timeout: Duration,
    },
}

/// Receives user-facing progress from the poller. Implementations must not
/// influence the wait itself.
pub trait Reporter {
    fn report(&mut self, event: &ProgressEvent);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct QuietReporter;

impl Reporter for QuietReporter {
    fn report(&mut self, _event: &ProgressEvent) {}
}

/// Writes one human-readable line per event.
pub struct ConsoleReporter<W: Write> {
    out: W,
    target: String,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, target: impl Into<String>) -> Self {
        Self {
            out,
            target: target.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, event: &ProgressEvent) {
        let line = format_event(&self.target, event);
        // Progress is advisory; a closed stdout must not abort the wait.
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }
}

pub fn format_event(target: &str, event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::Started { .. } => {
            format!("Waiting for OpenAI-compatible server at {target} to become ready...")
        }
        ProgressEvent::ProbeFailed { error, .. } => format!("Server not ready yet: {error}"),
        ProgressEvent::Ready { probe } => match probe {
            ProbeKind::HealthReady => "Server is ready! Health check succeeded.".to_string(),
            ProbeKind::Models => "Server is ready! Models endpoint is reachable.".to_string(),
        },
        ProgressEvent::Sleeping {
            elapsed,
            next_check,
        } => format!(
            "Waiting... (elapsed: {:.1}s, next check in {:.1}s)",
            elapsed.as_secs_f64(),
            next_check.as_secs_f64()
        ),
        ProgressEvent::TimedOut { timeout } => format!(
            "Timed out after {}s. The server may not be ready.",
            format_secs(*timeout)
        ),
    }
}

fn format_secs(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        format!("{:.1}", duration.as_secs_f64())
    }
}
