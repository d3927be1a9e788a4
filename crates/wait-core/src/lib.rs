pub mod backoff;
pub mod clock;
pub mod config;
pub mod model;
pub mod poller;
pub mod probe;
pub mod report;
pub mod session;
