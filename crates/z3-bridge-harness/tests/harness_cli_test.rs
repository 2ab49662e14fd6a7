use std::path::{Path, PathBuf};
use std::process::Command;

use z3_bridge_harness::probe::{ProbeExit, run_probe};
use z3_bridge_harness::scenarios::Scenario;
use z3_bridge_harness::structured_log::{RUN_END_EVENT, SCENARIO_RESULT_EVENT, validate_log_file};

fn harness_bin() -> &'static Path {
    Path::new(env!("CARGO_BIN_EXE_harness"))
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("z3-bridge-harness-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn probe_child_is_terminated_by_default_handler() {
    let report = run_probe(harness_bin()).unwrap();
    assert!(report.exit.terminated(), "{report:?}");
    assert_ne!(report.exit, ProbeExit::Returned);
}

#[test]
fn unhandled_scenario_passes_through_library_entrypoint() {
    let result = Scenario::Unhandled.run(harness_bin());
    assert!(result.passed(), "{}", result.detail);
    assert!(result.probe.is_some());
}

#[test]
fn run_writes_valid_log_and_passing_report() {
    let log = scratch("run.jsonl");
    let report = scratch("report.json");
    let status = Command::new(harness_bin())
        .args(["run", "--run-id", "ci-1", "--log"])
        .arg(&log)
        .arg("--report")
        .arg(&report)
        .status()
        .unwrap();
    assert!(status.success());

    let (lines, errors) = validate_log_file(&log).unwrap();
    assert!(errors.is_empty(), "{errors:?}");
    // run_start + four scenario results + run_end
    assert_eq!(lines, 6);

    let content = std::fs::read_to_string(&log).unwrap();
    let results: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
        .filter(|v| v["event"] == SCENARIO_RESULT_EVENT)
        .collect();
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|v| v["outcome"] == "pass"));
    assert!(
        results
            .iter()
            .all(|v| v["trace_id"].as_str().unwrap().starts_with("z3-bridge::ci-1::"))
    );

    let run_end: serde_json::Value = content
        .lines()
        .last()
        .map(|line| serde_json::from_str(line).unwrap())
        .unwrap();
    assert_eq!(run_end["event"], RUN_END_EVENT);
    assert_eq!(
        run_end["artifact_refs"],
        serde_json::json!([log.display().to_string(), report.display().to_string()])
    );

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(parsed["run_id"], "ci-1");
    assert_eq!(parsed["summary"]["total"], 4);
    assert_eq!(parsed["summary"]["passed"], 4);
    assert_eq!(parsed["scenarios"][1]["deliveries"], 1);
    assert_eq!(parsed["scenarios"][2]["deliveries"], 1);
    assert_ne!(parsed["scenarios"][3]["probe"]["exit"]["kind"], "returned");
    assert!(parsed["counters"]["delivered"].as_u64().unwrap() >= 2);
    assert_eq!(
        parsed["artifacts"]["artifacts"][0]["sha256"].as_str().map(str::len),
        Some(64)
    );
}

#[test]
fn validate_log_rejects_malformed_records() {
    let log = scratch("bad.jsonl");
    std::fs::write(
        &log,
        "{\"timestamp\":\"t\",\"trace_id\":\"a::b::001\",\"level\":\"info\",\"event\":\"ok\"}\n\
         {\"timestamp\":\"t\",\"trace_id\":\"nope\",\"level\":\"loud\",\"event\":\"scenario_result\"}\n",
    )
    .unwrap();

    let status = Command::new(harness_bin())
        .args(["validate-log", "--log"])
        .arg(&log)
        .status()
        .unwrap();
    assert!(!status.success());

    let (lines, errors) = validate_log_file(&log).unwrap();
    assert_eq!(lines, 2);
    assert!(errors.iter().all(|e| e.line_number == 2));
    assert!(errors.iter().any(|e| e.field == "level"));
    assert!(errors.iter().any(|e| e.field == "scenario"));
}
