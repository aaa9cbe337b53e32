//! On-disk YAML format of a suite file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level suite document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SuiteFile {
    /// Suite name shown in reports.
    pub name: String,
    /// Default per-scenario timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Scenario groups, run in order.
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

/// Scenarios sharing a working directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    /// Group name.
    pub name: String,
    /// Working directory, relative to the suite file unless absolute.
    pub directory: PathBuf,
    /// Scenarios, run in order.
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

/// One shell session and what it must produce.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    /// Scenario name.
    pub name: String,
    /// Shell command lines.
    #[serde(default)]
    pub commands: Vec<String>,
    /// Expected result.
    #[serde(default)]
    pub expect: Expectation,
    /// Overrides the suite timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Report the scenario as skipped without running it.
    #[serde(default)]
    pub skip: bool,
}

/// Expected exit status and output of a scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    /// Exit code the shell must finish with.
    #[serde(default)]
    pub exit_code: i32,
    /// Text that must appear in the captured stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout_contains: Option<String>,
}
