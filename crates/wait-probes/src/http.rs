use crate::errors::describe_failure;
use crate::target::ReadinessTarget;
use anyhow::Context;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;
use wait_core::model::ProbeKind;
use wait_core::probe::ReadinessProbe;

pub fn build_client(request_timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(request_timeout)
        .build()
        .context("build HTTP client")
}

/// `GET {base}{kind.path()}`; only the status code matters.
pub struct HttpProbe {
    kind: ProbeKind,
    url: String,
    client: Client,
}

impl HttpProbe {
    pub fn new(kind: ProbeKind, target: &ReadinessTarget, client: Client) -> Self {
        Self {
            kind,
            url: target.endpoint(kind),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReadinessProbe for HttpProbe {
    fn kind(&self) -> ProbeKind {
        self.kind
    }

    fn check(&self) -> anyhow::Result<u16> {
        let result = self
            .client
            .get(&self.url)
            .send()
            .with_context(|| format!("GET {}", self.url));
        match result {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!(probe = %self.kind, url = %self.url, status, "probe response");
                Ok(status)
            }
            Err(err) => {
                debug!(
                    probe = %self.kind,
                    url = %self.url,
                    failure = describe_failure(&err),
                    "probe request failed"
                );
                Err(err)
            }
        }
    }
}
