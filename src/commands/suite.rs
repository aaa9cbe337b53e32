//! `shell-harness suite` command.

use crate::adapters::live::LiveCommandRunner;
use crate::capture::MirrorTarget;
use crate::cli::SuiteArgs;
use crate::env;
use crate::suite::{Suite, SuiteReport};

/// Execute the `suite` command.
///
/// # Errors
///
/// Returns an error string if the suite cannot be loaded or any scenario
/// fails.
pub async fn run(args: &SuiteArgs) -> Result<(), String> {
    let suite = Suite::load(&args.file).map_err(|e| e.to_string())?;
    let environment = env::resolve(&args.shell.env_options()).map_err(|e| e.to_string())?;

    let mirror = if args.json { MirrorTarget::Stderr } else { MirrorTarget::Stdio };
    let runner = LiveCommandRunner::new(args.shell.shell_config()).with_mirror(mirror);
    let report = suite.run(&runner, &environment).await;

    if args.json {
        println!("{}", report.to_json().map_err(|e| format!("Failed to encode report: {e}"))?);
    } else {
        print!("{}", report.render());
    }
    verdict(&report)
}

fn verdict(report: &SuiteReport) -> Result<(), String> {
    if report.all_passed() {
        Ok(())
    } else {
        Err(format!("{} of {} scenarios failed", report.failed(), report.scenarios.len()))
    }
}
