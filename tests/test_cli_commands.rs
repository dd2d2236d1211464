mod common;

use common::{FAST_TIMING, run, write_file};

// ============================================================================
// version command
// ============================================================================

#[test]
fn version_human() {
    let output = run(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("reveal "), "{stdout}");
    assert!(stdout.contains('.'), "{stdout}");
}

#[test]
fn version_json() {
    let output = run(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("version JSON should be valid");
    assert_eq!(parsed["name"], "reveal");
    assert!(parsed.get("version").is_some());
}

// ============================================================================
// completions command
// ============================================================================

#[test]
fn completions_reference_binary() {
    for shell in ["bash", "zsh", "fish"] {
        let output = run(&["completions", shell]);
        assert!(output.status.success(), "completions {shell} should exit 0");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("reveal"), "{shell} completions: {stdout}");
    }
}

// ============================================================================
// validate command
// ============================================================================

#[test]
fn validate_accepts_good_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(dir.path(), "ok.yaml", FAST_TIMING);

    let output = run(&["validate", config.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains('✓'));
}

#[test]
fn validate_reports_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_file(dir.path(), "ok.yaml", "outcome: boy\n");
    let bad = write_file(dir.path(), "bad.yaml", "outcome: puppy\n");

    let output = run(&[
        "validate",
        "--format",
        "json",
        bad.to_str().unwrap(),
        good.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["valid"], false);
    assert_eq!(reports[1]["valid"], true);
}

#[test]
fn validate_warns_on_missing_sound() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(dir.path(), "reveal.yaml", "outcome: girl\n");

    let output = run(&["validate", "-f", "json", config.to_str().unwrap()]);
    assert!(output.status.success());
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(!reports[0]["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = run(&["dance"]);
    assert!(!output.status.success());
}
