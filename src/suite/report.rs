//! Scenario verdicts and suite reports.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a scenario ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// Finished as expected.
    Passed,
    /// Not run.
    Skipped,
    /// Finished, but not as expected.
    Failed {
        /// Summary of the mismatch.
        reason: String,
        /// Exit code of the shell, when it exited on its own.
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        /// Captured stdout.
        stdout: String,
        /// Captured stderr.
        stderr: String,
    },
    /// Killed after its time limit elapsed.
    TimedOut {
        /// Limit that elapsed, in milliseconds.
        after_ms: u64,
    },
}

impl Verdict {
    /// Builds a timed-out verdict.
    #[must_use]
    pub fn timed_out(after: Duration) -> Self {
        Self::TimedOut { after_ms: millis(after) }
    }

    /// Returns `true` unless the scenario failed or timed out.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Passed | Self::Skipped)
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Group the scenario belongs to.
    pub group: String,
    /// Scenario name.
    pub scenario: String,
    /// Outcome.
    #[serde(flatten)]
    pub verdict: Verdict,
    /// Time spent running the shell.
    pub duration_ms: u64,
}

/// Results of a whole suite run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Suite name.
    pub suite: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Per-scenario results, in execution order.
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    /// Starts an empty report.
    #[must_use]
    pub fn new(suite: impl Into<String>) -> Self {
        Self { suite: suite.into(), started_at: Utc::now(), scenarios: Vec::new() }
    }

    /// Number of passed scenarios.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Passed))
    }

    /// Number of failed or timed-out scenarios.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|v| !v.is_ok())
    }

    /// Number of skipped scenarios.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|v| matches!(v, Verdict::Skipped))
    }

    /// Returns `true` when nothing failed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&Verdict) -> bool) -> usize {
        self.scenarios.iter().filter(|s| pred(&s.verdict)).count()
    }

    /// Human-readable summary with failure diagnostics.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.suite);
        let mut current_group: Option<&str> = None;
        for report in &self.scenarios {
            if current_group != Some(report.group.as_str()) {
                let _ = writeln!(out, "  {}", report.group);
                current_group = Some(report.group.as_str());
            }
            match &report.verdict {
                Verdict::Passed => {
                    let _ =
                        writeln!(out, "    ok   {} ({}ms)", report.scenario, report.duration_ms);
                }
                Verdict::Skipped => {
                    let _ = writeln!(out, "    skip {}", report.scenario);
                }
                Verdict::TimedOut { after_ms } => {
                    let _ = writeln!(
                        out,
                        "    FAIL {} (timed out after {after_ms}ms)",
                        report.scenario
                    );
                }
                Verdict::Failed { reason, exit_code, stdout, stderr } => {
                    let _ =
                        writeln!(out, "    FAIL {} ({}ms)", report.scenario, report.duration_ms);
                    let _ = writeln!(out, "      {reason}");
                    if let Some(code) = exit_code {
                        let _ = writeln!(out, "      exit code: {code}");
                    }
                    write_block(&mut out, "stdout", stdout);
                    write_block(&mut out, "stderr", stderr);
                }
            }
        }
        let _ = writeln!(
            out,
            "\n{} passing, {} failing, {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        );
        out
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn write_block(out: &mut String, label: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    let _ = writeln!(out, "      {label}:");
    for line in text.lines() {
        let _ = writeln!(out, "        {line}");
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
