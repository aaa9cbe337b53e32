//! Binary entrypoint for the `shell-harness` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    shell_harness::logging::init_tracing();
    match shell_harness::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
