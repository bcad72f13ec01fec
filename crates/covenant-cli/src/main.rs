use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod args;
mod cmd;
mod io;
mod output;

fn main() -> Result<ExitCode> {
    let cli = args::Cli::parse();
    output::init(cli.json);

    // stdout carries command output; logs go to stderr.
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    cmd::dispatch(cli)
}
