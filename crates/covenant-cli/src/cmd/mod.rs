use std::process::ExitCode;

use anyhow::Result;

use crate::args::{Cli, Command};
use crate::io::input;

mod check_request;
mod inspect;
mod validate;

pub fn dispatch(cli: Cli) -> Result<ExitCode> {
    let cfg = input::load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Inspect { idl } => inspect::run(&idl, &cfg),
        Command::Validate {
            idl,
            type_name,
            optional,
            array_depth,
            response,
            value,
        } => validate::run(
            &idl,
            &cfg,
            validate::Target {
                type_name,
                optional,
                array_depth,
                response,
            },
            &value,
        ),
        Command::CheckRequest { idl, request } => check_request::run(&idl, &request, &cfg),
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
