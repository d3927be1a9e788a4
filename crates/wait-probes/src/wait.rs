use crate::registry::ProbeRegistry;
use crate::target::ReadinessTarget;
use std::io;
use std::time::Duration;
use tracing::info;
use wait_core::config::WaitConfig;
use wait_core::model::{ProbeKind, WaitOutcome};
use wait_core::poller::Poller;
use wait_core::report::{ConsoleReporter, QuietReporter};

/// Blocks until `base_url` answers 200 on one of `kinds` or `config.timeout`
/// passes. Errors only for invalid input; an unreachable server is a
/// `TimedOut` outcome.
pub fn wait_for_server(
    base_url: &str,
    config: &WaitConfig,
    kinds: &[ProbeKind],
    verbose: bool,
) -> anyhow::Result<WaitOutcome> {
    let target = ReadinessTarget::parse(base_url)?;
    config.validate()?;
    let registry = ProbeRegistry::new(config)?;
    let mut poller = Poller::new(config.clone(), registry.probes(&target, kinds))?;

    info!(
        target = %target,
        timeout_secs = config.timeout.as_secs_f64(),
        interval_secs = config.initial_interval.as_secs_f64(),
        "waiting for server"
    );
    let outcome = if verbose {
        let mut reporter = ConsoleReporter::new(io::stdout().lock(), base_url.trim());
        poller.wait(&mut reporter)
    } else {
        poller.wait(&mut QuietReporter)
    };
    Ok(outcome)
}

/// Default probes and backoff settings; `true` when the server became ready.
pub fn wait_until_ready(
    base_url: &str,
    timeout: Duration,
    initial_interval: Duration,
    verbose: bool,
) -> anyhow::Result<bool> {
    let config = WaitConfig {
        timeout,
        initial_interval,
        ..WaitConfig::default()
    };
    let outcome = wait_for_server(base_url, &config, &ProbeKind::DEFAULT_ORDER, verbose)?;
    Ok(outcome.is_ready())
}
