mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use vhdfix::{VhdfixError, util};

/// The engine's own non-zero exit status, when it reported one.
fn engine_exit_code(err: &anyhow::Error) -> Option<u8> {
    err.downcast_ref::<VhdfixError>()
        .and_then(VhdfixError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
}

fn main() -> ExitCode {
    let args = cli::Cli::parse();
    // Stdout carries the size report only; logs default to warn on stderr
    let _log_guard = util::init_logging("warn");

    match commands::convert::execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            engine_exit_code(&e)
                .map(ExitCode::from)
                .unwrap_or(ExitCode::FAILURE)
        }
    }
}
