use anyhow::{Context, bail};
use reqwest::Url;
use std::fmt;
use wait_core::model::ProbeKind;

/// Root URL of the server being waited on, e.g. `http://localhost:9090/v1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadinessTarget {
    base: String,
}

impl ReadinessTarget {
    pub fn parse(base_url: &str) -> anyhow::Result<Self> {
        let trimmed = base_url.trim();
        let url = Url::parse(trimmed).with_context(|| format!("invalid server URL: {trimmed}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("unsupported URL scheme {}: expected http or https", url.scheme());
        }
        if url.host_str().is_none_or(str::is_empty) {
            bail!("server URL has no host: {trimmed}");
        }
        Ok(Self {
            base: trimmed.trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn endpoint(&self, kind: ProbeKind) -> String {
        format!("{}{}", self.base, kind.path())
    }
}

impl fmt::Display for ReadinessTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}
