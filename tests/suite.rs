//! Suite loading and execution against real shells.

use std::path::Path;

use shell_harness::capture::MirrorTarget;
use shell_harness::suite::{Suite, Verdict};
use shell_harness::{env, LiveCommandRunner};

fn write_suite(dir: &Path, yaml: &str) -> std::path::PathBuf {
    std::fs::create_dir_all(dir.join("01-project")).unwrap();
    let path = dir.join("suite.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

#[tokio::test]
async fn runs_scenarios_in_order_and_reports_each() {
    let dir = std::env::temp_dir().join("shell_harness_suite_it");
    let path = write_suite(
        &dir,
        r"
name: tool
timeout_secs: 10
groups:
  - name: 01-project
    directory: 01-project
    scenarios:
      - name: prepare
        commands:
          - rm -f out.txt
          - echo built > out.txt
      - name: run
        commands: ['cat out.txt']
        expect:
          stdout_contains: built
      - name: broken
        commands: ['echo partial', 'exit 5']
      - name: slow
        commands: ['sleep 30']
        timeout_secs: 1
      - name: skipped
        skip: true
",
    );

    let suite = Suite::load(&path).unwrap();
    assert_eq!(suite.groups[0].directory, dir.join("01-project"));

    let runner = LiveCommandRunner::default().with_mirror(MirrorTarget::Discard);
    let report = suite.run(&runner, &env::current()).await;

    let verdicts: Vec<_> = report.scenarios.iter().map(|s| &s.verdict).collect();
    assert_eq!(verdicts[0], &Verdict::Passed);
    assert_eq!(verdicts[1], &Verdict::Passed);
    match verdicts[2] {
        Verdict::Failed { exit_code, stdout, .. } => {
            assert_eq!(*exit_code, Some(5));
            assert_eq!(stdout, "partial\n");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(verdicts[3], &Verdict::TimedOut { after_ms: 1000 });
    assert_eq!(verdicts[4], &Verdict::Skipped);

    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.skipped(), 1);
    assert!(report.render().contains("FAIL broken"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rejects_unknown_keys_in_suite_file() {
    let dir = std::env::temp_dir().join("shell_harness_suite_invalid");
    let path = write_suite(&dir, "name: bad\ngroups: []\nretries: 3\n");
    let err = Suite::load(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse suite file"));
    let _ = std::fs::remove_dir_all(&dir);
}
