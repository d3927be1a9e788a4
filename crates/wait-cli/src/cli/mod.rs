use crate::logging;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use wait_core::config::WaitConfig;
use wait_core::model::{ProbeKind, WaitOutcome};
use wait_probes::wait_for_server;

mod app;
mod args;

use args::*;

pub fn run() -> anyhow::Result<ExitCode> {
    app::run()
}
