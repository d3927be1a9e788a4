use super::*;

#[derive(Parser)]
#[command(
    name = "wait-openai",
    author,
    version,
    about = "Wait until an OpenAI-compatible server is ready"
)]
pub(super) struct Cli {
    #[arg(help = "Base URL of the server, e.g. http://localhost:9090/v1")]
    pub(super) url: String,
    #[arg(
        long,
        value_name = "SECONDS",
        help = "Maximum time to wait in seconds [default: 300]"
    )]
    pub(super) timeout: Option<u64>,
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = parse_seconds,
        help = "Initial check interval in seconds [default: 1.0]"
    )]
    pub(super) check_interval: Option<Duration>,
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = parse_seconds,
        help = "Upper bound for the interval between checks [default: 30]"
    )]
    pub(super) max_backoff: Option<Duration>,
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = parse_seconds,
        help = "Maximum random delay added to each interval [default: 0.5]"
    )]
    pub(super) jitter: Option<Duration>,
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = parse_seconds,
        help = "Timeout for a single readiness request [default: 5]"
    )]
    pub(super) request_timeout: Option<Duration>,
    #[arg(
        long = "probe",
        value_enum,
        value_delimiter = ',',
        help = "Readiness endpoints to try, in order [default: health,models]"
    )]
    pub(super) probes: Vec<ProbeKindValue>,
    #[arg(long, help = "JSON file with wait settings; flags take precedence")]
    pub(super) config: Option<PathBuf>,
    #[arg(long, help = "Do not print progress messages")]
    pub(super) quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub(super) enum ProbeKindValue {
    Health,
    Models,
}

impl From<ProbeKindValue> for ProbeKind {
    fn from(value: ProbeKindValue) -> Self {
        match value {
            ProbeKindValue::Health => ProbeKind::HealthReady,
            ProbeKindValue::Models => ProbeKind::Models,
        }
    }
}

pub(super) fn parse_seconds(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {value}"))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("seconds must be finite and non-negative, got {value}"))
}
