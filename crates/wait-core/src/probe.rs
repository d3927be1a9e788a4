use crate::model::ProbeKind;

pub const READY_STATUS: u16 = 200;

/// One readiness convention the poller can try against a server.
pub trait ReadinessProbe {
    fn kind(&self) -> ProbeKind;

    /// Issues a single request and returns its HTTP status code. Errors are
    /// connection-level failures; the poller treats them as "not ready".
    fn check(&self) -> anyhow::Result<u16>;
}

pub fn is_ready_status(status: u16) -> bool {
    status == READY_STATUS
}
