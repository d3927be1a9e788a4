use crate::http::{HttpProbe, build_client};
use crate::target::ReadinessTarget;
use reqwest::blocking::Client;
use wait_core::config::WaitConfig;
use wait_core::model::ProbeKind;
use wait_core::probe::ReadinessProbe;

/// Builds HTTP probes that share one client and its per-request timeout.
pub struct ProbeRegistry {
    client: Client,
}

impl ProbeRegistry {
    pub fn new(config: &WaitConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(config.request_timeout)?,
        })
    }

    pub fn probe(&self, kind: ProbeKind, target: &ReadinessTarget) -> Box<dyn ReadinessProbe> {
        Box::new(HttpProbe::new(kind, target, self.client.clone()))
    }

    /// Probes in the given order; repeated kinds are only probed once per cycle.
    pub fn probes(
        &self,
        target: &ReadinessTarget,
        kinds: &[ProbeKind],
    ) -> Vec<Box<dyn ReadinessProbe>> {
        let mut seen = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if !seen.contains(kind) {
                seen.push(*kind);
            }
        }
        seen.into_iter()
            .map(|kind| self.probe(kind, target))
            .collect()
    }
}
