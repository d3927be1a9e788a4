pub mod errors;
pub mod http;
pub mod registry;
pub mod target;
pub mod wait;

pub use registry::ProbeRegistry;
pub use target::ReadinessTarget;
pub use wait::{wait_for_server, wait_until_ready};
