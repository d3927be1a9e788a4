use super::*;

pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init();

    let config = resolve_config(&cli)?;
    let kinds = probe_order(&cli.probes);
    info!(
        url = %cli.url,
        probes = ?kinds,
        quiet = cli.quiet,
        "Running wait"
    );

    let outcome = wait_for_server(&cli.url, &config, &kinds, !cli.quiet)?;
    Ok(exit_code(&outcome))
}

/// Defaults, then the config file, then flags.
pub(super) fn resolve_config(cli: &Cli) -> anyhow::Result<WaitConfig> {
    let mut config = match &cli.config {
        Some(path) => WaitConfig::load(path)?,
        None => WaitConfig::default(),
    };
    if let Some(timeout) = cli.timeout {
        config.timeout = Duration::from_secs(timeout);
    }
    if let Some(interval) = cli.check_interval {
        config.initial_interval = interval;
    }
    if let Some(max_backoff) = cli.max_backoff {
        config.max_backoff = max_backoff;
    }
    if let Some(jitter) = cli.jitter {
        config.jitter = jitter;
    }
    if let Some(request_timeout) = cli.request_timeout {
        config.request_timeout = request_timeout;
    }
    config.validate().context("invalid wait settings")?;
    Ok(config)
}

pub(super) fn probe_order(values: &[ProbeKindValue]) -> Vec<ProbeKind> {
    if values.is_empty() {
        return ProbeKind::DEFAULT_ORDER.to_vec();
    }
    values.iter().copied().map(ProbeKind::from).collect()
}

pub(super) fn exit_code(outcome: &WaitOutcome) -> ExitCode {
    if outcome.is_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
