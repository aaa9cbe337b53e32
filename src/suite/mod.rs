//! Scenario suites: groups of shell sessions with expectations and timeouts.
//!
//! A suite is loaded from a YAML file (see [`format`]), run group by group and
//! scenario by scenario, and summarised in a [`SuiteReport`]. A failing
//! scenario never stops the ones after it.

pub mod format;
pub mod report;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, info_span, Instrument};

use crate::deadline::run_bounded;
use crate::ports::shell::{CommandRunner, ExecutionOutcome, ExecutionRequest};
use format::{Expectation, SuiteFile};
pub use report::{ScenarioReport, SuiteReport, Verdict};

/// Timeout applied to scenarios when the suite file sets none.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while loading a suite.
#[derive(Error, Debug)]
pub enum SuiteError {
    /// The suite file could not be read.
    #[error("Failed to read suite file {}: {source}", path.display())]
    Read {
        /// Suite file.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The suite file is not valid YAML for the suite format.
    #[error("Failed to parse suite file {}: {source}", path.display())]
    Parse {
        /// Suite file.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The suite parsed but is inconsistent.
    #[error("Invalid suite: {0}")]
    Invalid(String),
}

/// A loaded suite with directories and timeouts resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    /// Suite name.
    pub name: String,
    /// Groups in execution order.
    pub groups: Vec<Group>,
}

/// Scenarios sharing a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Group name.
    pub name: String,
    /// Resolved working directory.
    pub directory: PathBuf,
    /// Scenarios in execution order.
    pub scenarios: Vec<Scenario>,
}

/// One shell session with its expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Shell command lines.
    pub commands: Vec<String>,
    /// Expected exit code and output.
    pub expect: Expectation,
    /// Time limit; the shell's process group is killed once it elapses.
    pub timeout: Duration,
    /// Whether the scenario is skipped.
    pub skip: bool,
}

impl Suite {
    /// Loads a suite file, resolving group directories against the file's
    /// own directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, SuiteError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| SuiteError::Read { path: path.to_path_buf(), source })?;
        let file: SuiteFile = serde_yaml::from_str(&content)
            .map_err(|source| SuiteError::Parse { path: path.to_path_buf(), source })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_file(file, base)
    }

    /// Builds a suite from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns an error for empty names, duplicate scenario names within a
    /// group, or zero timeouts.
    pub fn from_file(file: SuiteFile, base: &Path) -> Result<Self, SuiteError> {
        if file.name.trim().is_empty() {
            return Err(SuiteError::Invalid("suite name is empty".into()));
        }
        let default_timeout = seconds(file.timeout_secs, DEFAULT_TIMEOUT, &file.name)?;

        let mut groups = Vec::with_capacity(file.groups.len());
        for group in file.groups {
            if group.name.trim().is_empty() {
                return Err(SuiteError::Invalid("group name is empty".into()));
            }
            let mut seen = HashSet::new();
            let mut scenarios = Vec::with_capacity(group.scenarios.len());
            for scenario in group.scenarios {
                if scenario.name.trim().is_empty() {
                    return Err(SuiteError::Invalid(format!(
                        "scenario with empty name in group '{}'",
                        group.name
                    )));
                }
                if !seen.insert(scenario.name.clone()) {
                    return Err(SuiteError::Invalid(format!(
                        "duplicate scenario '{}' in group '{}'",
                        scenario.name, group.name
                    )));
                }
                let timeout = seconds(scenario.timeout_secs, default_timeout, &scenario.name)?;
                scenarios.push(Scenario {
                    name: scenario.name,
                    commands: scenario.commands,
                    expect: scenario.expect,
                    timeout,
                    skip: scenario.skip,
                });
            }
            let directory = base.join(&group.directory);
            groups.push(Group { name: group.name, directory, scenarios });
        }

        Ok(Self { name: file.name, groups })
    }

    /// Total number of scenarios.
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.groups.iter().map(|g| g.scenarios.len()).sum()
    }

    /// Runs every scenario in order with the given environment.
    pub async fn run(
        &self,
        runner: &dyn CommandRunner,
        environment: &BTreeMap<String, String>,
    ) -> SuiteReport {
        let mut report = SuiteReport::new(&self.name);
        info!(suite = %self.name, scenarios = self.scenario_count(), "running suite");
        for group in &self.groups {
            for scenario in &group.scenarios {
                let span = info_span!("scenario", group = %group.name, name = %scenario.name);
                let result = run_scenario(runner, group, scenario, environment)
                    .instrument(span)
                    .await;
                report.scenarios.push(result);
            }
        }
        info!(
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "suite finished"
        );
        report
    }
}

async fn run_scenario(
    runner: &dyn CommandRunner,
    group: &Group,
    scenario: &Scenario,
    environment: &BTreeMap<String, String>,
) -> ScenarioReport {
    let finish = |verdict, duration: Duration| ScenarioReport {
        group: group.name.clone(),
        scenario: scenario.name.clone(),
        verdict,
        duration_ms: report::millis(duration),
    };

    if scenario.skip {
        info!("skipped");
        return finish(Verdict::Skipped, Duration::ZERO);
    }

    let request = ExecutionRequest::new(&group.directory, scenario.commands.iter().cloned())
        .with_environment(environment.clone());
    let bounded = run_bounded(runner, &request, Some(scenario.timeout)).await;
    let verdict = if bounded.timed_out {
        Verdict::timed_out(scenario.timeout)
    } else {
        judge(&scenario.expect, &bounded.outcome)
    };
    info!(
        ok = verdict.is_ok(),
        elapsed_ms = report::millis(bounded.elapsed),
        "scenario finished"
    );
    finish(verdict, bounded.elapsed)
}

/// Compares an execution outcome with what the scenario expects.
#[must_use]
pub fn judge(expect: &Expectation, outcome: &ExecutionOutcome) -> Verdict {
    let stdout = match outcome {
        Ok(output) if expect.exit_code == 0 => output.clone(),
        Ok(output) => {
            return Verdict::Failed {
                reason: format!(
                    "Expected exit code {}, but commands succeeded",
                    expect.exit_code
                ),
                exit_code: Some(0),
                stdout: output.clone(),
                stderr: String::new(),
            };
        }
        Err(err) if err.exit_code() == Some(expect.exit_code) => err.stdout(),
        Err(err) => {
            return Verdict::Failed {
                reason: err.message(),
                exit_code: err.exit_code(),
                stdout: err.stdout(),
                stderr: err.stderr(),
            };
        }
    };

    match &expect.stdout_contains {
        Some(needle) if !stdout.contains(needle.as_str()) => Verdict::Failed {
            reason: format!("Expected stdout to contain '{needle}'"),
            exit_code: Some(expect.exit_code),
            stderr: outcome.as_ref().err().map(|err| err.stderr()).unwrap_or_default(),
            stdout,
        },
        _ => Verdict::Passed,
    }
}

fn seconds(value: Option<u64>, default: Duration, owner: &str) -> Result<Duration, SuiteError> {
    match value {
        None => Ok(default),
        Some(0) => Err(SuiteError::Invalid(format!("timeout_secs of '{owner}' must be positive"))),
        Some(secs) => Ok(Duration::from_secs(secs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;
    use crate::suite::format::{GroupSpec, ScenarioSpec};

    fn scenario_spec(name: &str, commands: &[&str]) -> ScenarioSpec {
        ScenarioSpec {
            name: name.into(),
            commands: commands.iter().map(ToString::to_string).collect(),
            expect: Expectation::default(),
            timeout_secs: None,
            skip: false,
        }
    }

    fn suite_file(scenarios: Vec<ScenarioSpec>) -> SuiteFile {
        SuiteFile {
            name: "suite".into(),
            timeout_secs: None,
            groups: vec![GroupSpec { name: "group".into(), directory: "work".into(), scenarios }],
        }
    }

    fn non_zero(code: i32, stdout: &str) -> ExecutionOutcome {
        Err(ExecutionError::NonZeroExit {
            code,
            stdout_chunks: vec![stdout.into()],
            stderr_chunks: vec!["err\n".into()],
        })
    }

    #[test]
    fn resolves_directories_and_timeouts() {
        let mut file = suite_file(vec![scenario_spec("a", &["true"]), {
            let mut slow = scenario_spec("b", &[]);
            slow.timeout_secs = Some(90);
            slow
        }]);
        file.timeout_secs = Some(10);
        let suite = Suite::from_file(file, Path::new("/suites")).unwrap();
        let group = &suite.groups[0];
        assert_eq!(group.directory, PathBuf::from("/suites/work"));
        assert_eq!(group.scenarios[0].timeout, Duration::from_secs(10));
        assert_eq!(group.scenarios[1].timeout, Duration::from_secs(90));
        assert_eq!(suite.scenario_count(), 2);
    }

    #[test]
    fn absolute_directories_are_kept() {
        let mut file = suite_file(vec![]);
        file.groups[0].directory = PathBuf::from("/abs/dir");
        let suite = Suite::from_file(file, Path::new("/suites")).unwrap();
        assert_eq!(suite.groups[0].directory, PathBuf::from("/abs/dir"));
    }

    #[test]
    fn default_timeout_is_thirty_seconds() {
        let suite = Suite::from_file(suite_file(vec![scenario_spec("a", &[])]), Path::new("."))
            .unwrap();
        assert_eq!(suite.groups[0].scenarios[0].timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn rejects_duplicate_scenarios() {
        let file = suite_file(vec![scenario_spec("run", &[]), scenario_spec("run", &[])]);
        let err = Suite::from_file(file, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("duplicate scenario 'run'"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut file = suite_file(vec![scenario_spec("run", &[])]);
        file.groups[0].scenarios[0].timeout_secs = Some(0);
        assert!(Suite::from_file(file, Path::new(".")).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Suite::load(Path::new("/does/not/exist/suite.yaml")).unwrap_err();
        assert!(matches!(err, SuiteError::Read { .. }));
    }

    #[test]
    fn judge_success() {
        let verdict = judge(&Expectation::default(), &Ok("hello\n".into()));
        assert_eq!(verdict, Verdict::Passed);
    }

    #[test]
    fn judge_unexpected_failure_carries_diagnostics() {
        let verdict = judge(&Expectation::default(), &non_zero(3, "one\n"));
        let Verdict::Failed { reason, exit_code, stdout, stderr } = verdict else {
            panic!("expected failure");
        };
        assert_eq!(reason, "Commands exited with code: 3");
        assert_eq!(exit_code, Some(3));
        assert_eq!(stdout, "one\n");
        assert_eq!(stderr, "err\n");
    }

    #[test]
    fn judge_expected_failure_passes() {
        let expect = Expectation { exit_code: 3, stdout_contains: Some("one".into()) };
        assert_eq!(judge(&expect, &non_zero(3, "one\n")), Verdict::Passed);
    }

    #[test]
    fn judge_expected_failure_but_success_fails() {
        let expect = Expectation { exit_code: 2, stdout_contains: None };
        assert!(!judge(&expect, &Ok(String::new())).is_ok());
    }

    #[test]
    fn judge_missing_stdout_text_fails() {
        let expect = Expectation { exit_code: 0, stdout_contains: Some("world".into()) };
        let verdict = judge(&expect, &Ok("hello\n".into()));
        assert!(matches!(verdict, Verdict::Failed { ref reason, .. } if reason.contains("world")));
    }
}
