//! Shared integration-test harness for running the `reveal` binary.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};

use serde_json::Value;

/// Timing that finishes a whole presentation in well under a second.
pub const FAST_TIMING: &str = "\
timing:
  countdown_from: 2
  countdown_tick: 20ms
  countdown_hold: 10ms
  fast_ramp_interval: 1ms
  slow_ramp_interval: 2ms
  glitch_hold: 10ms
  error_hold: 20ms
";

/// Path to the compiled binary.
pub fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_reveal")
}

/// Runs `reveal` with `args` and waits for it to exit.
#[allow(clippy::missing_panics_doc)]
pub fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .env_remove("REVEAL_CONFIG")
        .env_remove("REVEAL_OUTCOME")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run reveal")
}

/// Spawns `reveal` with piped stdout.
#[allow(clippy::missing_panics_doc)]
pub fn spawn(args: &[&str]) -> Child {
    Command::new(bin())
        .args(args)
        .env_remove("REVEAL_CONFIG")
        .env_remove("REVEAL_OUTCOME")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn reveal")
}

/// Writes `contents` to `name` inside `dir`.
#[allow(clippy::missing_panics_doc)]
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
    path
}

/// Parses JSONL output into values, ignoring non-JSON lines.
pub fn parse_events(text: &str) -> Vec<Value> {
    text.lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .collect()
}

/// The `type` tag of every event, in order.
pub fn event_types(events: &[Value]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| e["type"].as_str().map(str::to_owned))
        .collect()
}
