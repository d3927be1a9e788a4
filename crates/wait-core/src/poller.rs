use crate::clock::{Clock, Jitter, SystemClock, ThreadRngJitter};
use crate::config::{ConfigError, WaitConfig};
use crate::model::{ProbeKind, WaitOutcome};
use crate::probe::{ReadinessProbe, is_ready_status};
use crate::report::{ProgressEvent, Reporter};
use crate::session::PollSession;
use tracing::{debug, info};

/// Blocking readiness loop: probe every convention in order, back off with
/// jitter, repeat until one answers 200 or the timeout passes.
pub struct Poller<C = SystemClock, J = ThreadRngJitter> {
    config: WaitConfig,
    probes: Vec<Box<dyn ReadinessProbe>>,
    clock: C,
    jitter: J,
}

impl Poller {
    pub fn new(
        config: WaitConfig,
        probes: Vec<Box<dyn ReadinessProbe>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if probes.is_empty() {
            return Err(ConfigError::NoProbes);
        }
        Ok(Self {
            config,
            probes,
            clock: SystemClock,
            jitter: ThreadRngJitter,
        })
    }
}

impl<C: Clock, J: Jitter> Poller<C, J> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Poller<C2, J> {
        Poller {
            config: self.config,
            probes: self.probes,
            clock,
            jitter: self.jitter,
        }
    }

    pub fn with_jitter<J2: Jitter>(self, jitter: J2) -> Poller<C, J2> {
        Poller {
            config: self.config,
            probes: self.probes,
            clock: self.clock,
            jitter,
        }
    }

    pub fn wait(&mut self, reporter: &mut dyn Reporter) -> WaitOutcome {
        let timeout = self.config.timeout;
        let mut session = PollSession::start(&self.config, self.clock.now());
        reporter.report(&ProgressEvent::Started { timeout });

        while !session.is_expired(self.clock.now()) {
            session.record_attempt();
            let attempt = session.attempts();

            if let Some(probe) = self.probe_cycle(attempt, reporter) {
                let elapsed = session.elapsed(self.clock.now());
                info!(
                    probe = %probe,
                    attempts = attempt,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "server ready"
                );
                reporter.report(&ProgressEvent::Ready { probe });
                return WaitOutcome::Ready {
                    probe,
                    attempts: attempt,
                    elapsed,
                };
            }

            let jitter = self.jitter.sample(self.config.jitter);
            let sleep = session.backoff().sleep_for(jitter);
            let elapsed = session.elapsed(self.clock.now());
            debug!(
                attempt,
                interval_ms = session.current_interval().as_millis() as u64,
                sleep_ms = sleep.as_millis() as u64,
                "server not ready; backing off"
            );
            reporter.report(&ProgressEvent::Sleeping {
                elapsed,
                next_check: sleep,
            });
            self.clock.sleep(sleep);
            session.backoff_mut().grow();
        }

        let elapsed = session.elapsed(self.clock.now());
        info!(
            attempts = session.attempts(),
            timeout_secs = timeout.as_secs_f64(),
            "timed out waiting for server"
        );
        reporter.report(&ProgressEvent::TimedOut { timeout });
        WaitOutcome::TimedOut {
            attempts: session.attempts(),
            elapsed,
        }
    }

    /// Runs each probe at most once, stopping at the first 200.
    fn probe_cycle(&self, attempt: u32, reporter: &mut dyn Reporter) -> Option<ProbeKind> {
        for probe in &self.probes {
            let kind = probe.kind();
            match probe.check() {
                Ok(status) if is_ready_status(status) => return Some(kind),
                Ok(status) => {
                    debug!(probe = %kind, attempt, status, "probe answered but not ready");
                }
                Err(err) if kind.is_advisory() => {
                    debug!(probe = %kind, attempt, error = %err, "advisory probe failed");
                }
                Err(err) => {
                    info!(probe = %kind, attempt, error = %err, "probe failed");
                    reporter.report(&ProgressEvent::ProbeFailed {
                        probe: kind,
                        error: format!("{err:#}"),
                    });
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::interval_for_attempt;
    use crate::clock::FixedJitter;
    use anyhow::anyhow;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    #[derive(Clone)]
    struct ManualClock {
        base: Instant,
        offset: Rc<Cell<Duration>>,
        sleeps: Rc<RefCell<Vec<Duration>>>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                offset: Rc::new(Cell::new(Duration::ZERO)),
                sleeps: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn advance(&self, duration: Duration) {
            self.offset.set(self.offset.get() + duration);
        }

        fn elapsed(&self) -> Duration {
            self.offset.get()
        }

        fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.borrow().clone()
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + self.offset.get()
        }

        fn sleep(&self, duration: Duration) {
            self.sleeps.borrow_mut().push(duration);
            self.advance(duration);
        }
    }

    type Calls = Rc<RefCell<Vec<ProbeKind>>>;

    /// Replays scripted responses, then repeats `fallback` forever.
    struct ScriptedProbe {
        kind: ProbeKind,
        script: RefCell<VecDeque<Result<u16, &'static str>>>,
        fallback: Result<u16, &'static str>,
        calls: Calls,
        cost: Option<(ManualClock, Duration)>,
    }

    impl ScriptedProbe {
        fn new(kind: ProbeKind, fallback: Result<u16, &'static str>, calls: &Calls) -> Self {
            Self {
                kind,
                script: RefCell::new(VecDeque::new()),
                fallback,
                calls: calls.clone(),
                cost: None,
            }
        }

        fn then(self, response: Result<u16, &'static str>) -> Self {
            self.script.borrow_mut().push_back(response);
            self
        }

        fn costing(mut self, clock: &ManualClock, duration: Duration) -> Self {
            self.cost = Some((clock.clone(), duration));
            self
        }
    }

    impl ReadinessProbe for ScriptedProbe {
        fn kind(&self) -> ProbeKind {
            self.kind
        }

        fn check(&self) -> anyhow::Result<u16> {
            self.calls.borrow_mut().push(self.kind);
            if let Some((clock, duration)) = &self.cost {
                clock.advance(*duration);
            }
            let response = self
                .script
                .borrow_mut()
                .pop_front()
                .unwrap_or(self.fallback);
            response.map_err(|message| anyhow!(message))
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Vec<ProgressEvent>,
    }

    impl Reporter for RecordingReporter {
        fn report(&mut self, event: &ProgressEvent) {
            self.events.push(event.clone());
        }
    }

    fn config(timeout_secs: u64) -> WaitConfig {
        WaitConfig {
            timeout: Duration::from_secs(timeout_secs),
            ..WaitConfig::default()
        }
    }

    fn poller(
        config: WaitConfig,
        probes: Vec<Box<dyn ReadinessProbe>>,
        clock: &ManualClock,
        jitter: Duration,
    ) -> Poller<ManualClock, FixedJitter> {
        Poller::new(config, probes)
            .unwrap()
            .with_clock(clock.clone())
            .with_jitter(FixedJitter(jitter))
    }

    fn count(calls: &Calls, kind: ProbeKind) -> usize {
        calls.borrow().iter().filter(|call| **call == kind).count()
    }

    #[test]
    fn health_ready_immediately_needs_no_sleep() {
        let calls = Calls::default();
        let clock = ManualClock::new();
        let probes: Vec<Box<dyn ReadinessProbe>> = vec![
            Box::new(ScriptedProbe::new(ProbeKind::HealthReady, Ok(200), &calls)),
            Box::new(ScriptedProbe::new(ProbeKind::Models, Ok(200), &calls)),
        ];

        let outcome = poller(config(300), probes, &clock, Duration::ZERO)
            .wait(&mut RecordingReporter::default());

        assert_eq!(
            outcome,
            WaitOutcome::Ready {
                probe: ProbeKind::HealthReady,
                attempts: 1,
                elapsed: Duration::ZERO,
            }
        );
        assert!(clock.sleeps().is_empty());
        assert_eq!(count(&calls, ProbeKind::Models), 0);
    }

    #[test]
    fn models_ready_on_third_attempt_after_two_sleeps() {
        let calls = Calls::default();
        let clock = ManualClock::new();
        let probes: Vec<Box<dyn ReadinessProbe>> = vec![
            Box::new(ScriptedProbe::new(
                ProbeKind::HealthReady,
                Err("connection refused"),
                &calls,
            )),
            Box::new(
                ScriptedProbe::new(ProbeKind::Models, Ok(200), &calls)
                    .then(Ok(503))
                    .then(Err("connection reset")),
            ),
        ];

        let outcome = poller(config(300), probes, &clock, Duration::ZERO)
            .wait(&mut RecordingReporter::default());

        assert!(outcome.is_ready());
        assert_eq!(outcome.attempts(), 3);
        assert_eq!(clock.sleeps().len(), 2);
        assert_eq!(
            *calls.borrow(),
            vec![
                ProbeKind::HealthReady,
                ProbeKind::Models,
                ProbeKind::HealthReady,
                ProbeKind::Models,
                ProbeKind::HealthReady,
                ProbeKind::Models,
            ]
        );
    }

    #[test]
    fn health_ready_on_attempt_k_stops_probing() {
        let calls = Calls::default();
        let clock = ManualClock::new();
        let probes: Vec<Box<dyn ReadinessProbe>> = vec![
            Box::new(
                ScriptedProbe::new(ProbeKind::HealthReady, Ok(200), &calls)
                    .then(Ok(503))
                    .then(Ok(503)),
            ),
            Box::new(ScriptedProbe::new(ProbeKind::Models, Ok(404), &calls)),
        ];

        let outcome = poller(config(300), probes, &clock, Duration::ZERO)
            .wait(&mut RecordingReporter::default());

        assert!(matches!(
            outcome,
            WaitOutcome::Ready {
                probe: ProbeKind::HealthReady,
                attempts: 3,
                ..
            }
        ));
        assert_eq!(count(&calls, ProbeKind::HealthReady), 3);
        // A non-200 health answer still falls through to the models probe.
        assert_eq!(count(&calls, ProbeKind::Models), 2);
    }

    #[test]
    fn times_out_after_short_window() {
        let calls = Calls::default();
        let clock = ManualClock::new();
        let config = WaitConfig {
            timeout: Duration::from_secs(2),
            initial_interval: Duration::from_secs(1),
            ..WaitConfig::default()
        };
        let probes: Vec<Box<dyn ReadinessProbe>> = vec![
            Box::new(ScriptedProbe::new(
                ProbeKind::HealthReady,
                Err("refused"),
                &calls,
            )),
            Box::new(ScriptedProbe::new(ProbeKind::Models, Ok(503), &calls)),
        ];

        let outcome = poller(config, probes, &clock, Duration::ZERO)
            .wait(&mut RecordingReporter::default());

        assert_eq!(
            outcome,
            WaitOutcome::TimedOut {
                attempts: 2,
                elapsed: Duration::from_millis(2500),
            }
        );
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_millis(1500)]
        );
    }

    #[test]
    fn short_window_with_full_jitter_stays_bounded() {
        let calls = Calls::default();
        let clock = ManualClock::new();
        let config = WaitConfig {
            timeout: Duration::from_secs(2),
            ..WaitConfig::default()
        };
        let probes: Vec<Box<dyn ReadinessProbe>> = vec![Box::new(ScriptedProbe::new(
            ProbeKind::Models,
            Err("refused"),
            &calls,
        ))];

        let outcome = poller(config, probes, &clock, Duration::from_millis(500))
            .wait(&mut RecordingReporter::default());

        assert!(!outcome.is_ready());
        assert!(outcome.elapsed() >= Duration::from_secs(2));
        assert!(outcome.elapsed() <= Duration::from_millis(3500));
    }

    #[test]
    fn zero_timeout_returns_without_probing() {
        let calls = Calls::default();
        let clock = ManualClock::new();
        let config = WaitConfig {
            timeout: Duration::ZERO,
            ..WaitConfig::default()
        };
        let probes: Vec<Box<dyn ReadinessProbe>> = vec![Box::new(ScriptedProbe::new(
            ProbeKind::HealthReady,
            Ok(200),
            &calls,
        ))];
        let mut reporter = RecordingReporter::default();

        let outcome = poller(config, probes, &clock, Duration::ZERO).wait(&mut reporter);

        assert_eq!(
            outcome,
            WaitOutcome::TimedOut {
                attempts: 0,
                elapsed: Duration::ZERO,
            }
        );
        assert!(calls.borrow().is_empty());
        assert!(clock.sleeps().is_empty());
        assert_eq!(reporter.events.len(), 2);
    }

    #[test]
    fn sleeps_follow_capped_exponential_schedule() {
        let calls = Calls::default();
        let clock = ManualClock::new();
        let probes: Vec<Box<dyn ReadinessProbe>> = vec![
            Box::new(ScriptedProbe::new(ProbeKind::HealthReady, Ok(404), &calls)),
            Box::new(ScriptedProbe::new(ProbeKind::Models, Err("refused"), &calls)),
        ];

        let outcome = poller(config(200), probes, &clock, Duration::ZERO)
            .wait(&mut RecordingReporter::default());

        let sleeps = clock.sleeps();
        assert_eq!(sleeps.len() as u32, outcome.attempts());
        for (index, sleep) in sleeps.iter().enumerate() {
            let attempt = index as u32 + 1;
            let expected =
                interval_for_attempt(Duration::from_secs(1), attempt, Duration::from_secs(30));
            assert!(sleep.abs_diff(expected) < Duration::from_micros(1));
        }
        assert!(sleeps.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(outcome.elapsed() >= Duration::from_secs(200));
        assert!(outcome.elapsed() < Duration::from_secs(230));
    }

    #[test]
    fn jitter_at_ceiling_never_exceeds_max_backoff() {
        let calls = Calls::default();
        let clock = ManualClock::new();
        let config = WaitConfig {
            timeout: Duration::from_secs(120),
            initial_interval: Duration::from_secs(30),
            ..WaitConfig::default()
        };
        let probes: Vec<Box<dyn ReadinessProbe>> = vec![Box::new(ScriptedProbe::new(
            ProbeKind::Models,
            Ok(503),
            &calls,
        ))];

        poller(config, probes, &clock, Duration::from_millis(500))
            .wait(&mut RecordingReporter::default());

        let sleeps = clock.sleeps();
        assert_eq!(sleeps.len(), 4);
        assert!(sleeps.iter().all(|sleep| *sleep == Duration::from_secs(30)));
    }

    #[test]
    fn slow_probes_overshoot_by_at_most_one_cycle() {
        let calls = Calls::default();
        let clock = ManualClock::new();
        let request_timeout = Duration::from_secs(5);
        let probes: Vec<Box<dyn ReadinessProbe>> = vec![
            Box::new(
                ScriptedProbe::new(ProbeKind::HealthReady, Err("timed out"), &calls)
                    .costing(&clock, request_timeout),
            ),
            Box::new(
                ScriptedProbe::new(ProbeKind::Models, Err("timed out"), &calls)
                    .costing(&clock, request_timeout),
            ),
        ];

        let outcome = poller(config(12), probes, &clock, Duration::ZERO)
            .wait(&mut RecordingReporter::default());

        assert_eq!(outcome.attempts(), 2);
        assert_eq!(clock.elapsed(), Duration::from_millis(22_500));
        let one_cycle = request_timeout * 2 + Duration::from_secs(30);
        assert!(outcome.elapsed() < Duration::from_secs(12) + one_cycle);
    }

    #[test]
    fn only_non_advisory_failures_are_reported() {
        let calls = Calls::default();
        let clock = ManualClock::new();
        let probes: Vec<Box<dyn ReadinessProbe>> = vec![
            Box::new(ScriptedProbe::new(
                ProbeKind::HealthReady,
                Err("dns failure"),
                &calls,
            )),
            Box::new(
                ScriptedProbe::new(ProbeKind::Models, Ok(200), &calls).then(Err("refused")),
            ),
        ];
        let mut reporter = RecordingReporter::default();

        poller(config(300), probes, &clock, Duration::ZERO).wait(&mut reporter);

        assert_eq!(
            reporter.events,
            vec![
                ProgressEvent::Started {
                    timeout: Duration::from_secs(300),
                },
                ProgressEvent::ProbeFailed {
                    probe: ProbeKind::Models,
                    error: "refused".to_string(),
                },
                ProgressEvent::Sleeping {
                    elapsed: Duration::ZERO,
                    next_check: Duration::from_secs(1),
                },
                ProgressEvent::Ready {
                    probe: ProbeKind::Models,
                },
            ]
        );
    }

    #[test]
    fn rejects_empty_probe_list() {
        let result = Poller::new(WaitConfig::default(), Vec::new());
        assert!(matches!(result, Err(ConfigError::NoProbes)));
    }

    #[test]
    fn rejects_invalid_config() {
        let calls = Calls::default();
        let config = WaitConfig {
            request_timeout: Duration::ZERO,
            ..WaitConfig::default()
        };
        let probes: Vec<Box<dyn ReadinessProbe>> = vec![Box::new(ScriptedProbe::new(
            ProbeKind::Models,
            Ok(200),
            &calls,
        ))];
        assert!(matches!(
            Poller::new(config, probes),
            Err(ConfigError::NotPositive {
                field: "request_timeout"
            })
        ));
    }
}
