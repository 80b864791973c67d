use serde_json::Value;
use std::process::{Command, Output};

fn workspace_root() -> String {
    format!("{}/../..", env!("CARGO_MANIFEST_DIR"))
}

fn assertive(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_assertive"))
        .args(args)
        .env("RUST_LOG", "warn")
        .current_dir(workspace_root())
        .output()
        .expect("failed to execute assertive")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn json_stdout(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "output should be JSON (status={:?}, stderr={}). parse error: {e}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_a_typed_unit() {
    let output = assertive(&["check", "corpus/add_two.json", "--format", "json"]);
    assert_eq!(output.status.code(), Some(0));
    let report = json_stdout(&output);
    assert_eq!(report["status"], "ok");
    assert_eq!(report["target"], "Main");
    assert_eq!(report["theorems"], 2);
}

#[test]
fn check_rejects_an_untyped_unit() {
    let output = assertive(&["check", "corpus/untyped.json"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("procedure Main.Add_Two"), "stderr={stderr}");
}

#[test]
fn missing_file_is_an_error_not_a_panic() {
    let output = assertive(&["check", "corpus/does_not_exist.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read"));
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_prints_condition_blocks() {
    let output = assertive(&["generate", "corpus/add_two.json"]);
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert_eq!(text.matches("Goal(s):").count(), 3, "{text}");
    assert!(text.contains("Ensures Clause of Add_Two"));
    assert!(text.contains("?x = (x + 2)"));
    assert!(!text.contains("Verdicts:"));
}

#[test]
fn generate_json_is_stable_across_runs() {
    let first = json_stdout(&assertive(&["generate", "corpus/count_loop.json", "--format", "json"]));
    let second = json_stdout(&assertive(&["generate", "corpus/count_loop.json", "--format", "json"]));
    assert_eq!(first, second);

    let vcs = first["vcs"].as_array().expect("vcs array");
    assert!(vcs.len() >= 2);
    for vc in vcs {
        assert_eq!(vc["sha256"].as_str().map(str::len), Some(64));
    }
    assert!(first.get("verdicts").is_none());
}

#[test]
fn generate_theory_has_one_lemma_per_condition() {
    let output = assertive(&["generate", "corpus/add_two.json", "--format", "theory"]);
    let text = stdout(&output);
    assert!(text.starts_with("theory Main_VCs\nbegin\n"), "{text}");
    assert_eq!(text.matches("\nlemma VC_").count(), 3);
}

#[test]
fn abandoned_obligation_sets_exit_status_two() {
    let output = assertive(&["generate", "corpus/missing_spec.json"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("[missing-specification]"));
}

#[test]
fn verbose_generation_prints_the_rule_trace() {
    let output = assertive(&["generate", "corpus/add_two.json", "--verbose"]);
    assert!(stdout(&output).starts_with("Proof-rule trace:"));
}

// ---------------------------------------------------------------------------
// prove
// ---------------------------------------------------------------------------

#[test]
fn prove_succeeds_when_every_condition_is_proved() {
    let output = assertive(&["prove", "corpus/restores.json"]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stdout={} stderr={}",
        stdout(&output),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout(&output).contains("Verdicts:"));
}

#[test]
fn prove_reports_unproved_conditions_with_status_two() {
    for strategy in ["default", "legacy"] {
        let output = assertive(&[
            "prove",
            "corpus/add_two.json",
            "--simplify",
            "--strategy",
            strategy,
            "--format",
            "json",
        ]);
        assert_eq!(output.status.code(), Some(2), "{strategy}");
        let report = json_stdout(&output);
        assert_eq!(report["summary"]["proved"], 1, "{strategy}");
        assert_eq!(report["summary"]["unproved"], 2, "{strategy}");
        assert_eq!(report["diagnostics"][0]["code"], "malformed-rule");
    }
}

#[test]
fn missing_specification_is_a_fatal_verdict() {
    let output = assertive(&["prove", "corpus/missing_spec.json", "--format", "json"]);
    assert_eq!(output.status.code(), Some(2));
    let report = json_stdout(&output);
    let verdicts = report["verdicts"].as_array().expect("verdicts");
    assert!(verdicts
        .iter()
        .any(|v| v["status"] == "fatal-spec-missing" && v["name"] == "Procedure Choose"));
}

#[test]
fn unknown_strategy_is_rejected() {
    let output = assertive(&["prove", "corpus/add_two.json", "--strategy", "bfs"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown strategy"));
}

#[test]
fn out_flag_writes_the_rendered_output() {
    let dir = std::env::temp_dir().join(format!("assertive-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("vcs.txt");
    let output = assertive(&["generate", "corpus/add_two.json", "--out", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.trim_end(), stdout(&output).trim_end());
    let _ = std::fs::remove_dir_all(&dir);
}
