//! Integration tests for roomtone-cli.
//!
//! Tests run the `roomtone` binary against built-in scenes and scene files
//! written to temporary directories.

use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to get the path to the `roomtone` binary built by cargo.
fn roomtone_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_roomtone"))
}

fn run(args: &[&str]) -> Output {
    roomtone_bin()
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run roomtone {args:?}: {e}"))
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// `roomtone scenes`
// ---------------------------------------------------------------------------

#[test]
fn scenes_lists_builtins() {
    let output = run(&["scenes"]);
    assert!(output.status.success(), "roomtone scenes failed");

    let out = stdout(&output);
    assert!(out.contains("Built-in Scenes"));
    for name in ["corridor", "apartment", "tower"] {
        assert!(out.contains(name), "listing should contain '{name}'");
    }
}

#[test]
fn scenes_prints_one_as_toml() {
    let output = run(&["scenes", "tower"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("name = \"Tower\""));
    assert!(out.contains("Stairwell"));
}

#[test]
fn unknown_builtin_scene_fails() {
    let output = run(&["scenes", "lighthouse"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `roomtone inspect` / `roomtone route`
// ---------------------------------------------------------------------------

#[test]
fn inspect_shows_graph() {
    let output = run(&["inspect", "corridor"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("Scene: Corridor"));
    assert!(out.contains("Zones (4):"), "three rooms plus the synthesized global");
    assert!(out.contains("Connectors (2):"));
    assert!(out.contains("closed"));
    assert!(out.contains("radio"));
}

#[test]
fn route_through_closed_door() {
    let output = run(&["route", "corridor", "A", "C"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("A -> B -> C"), "unexpected path in:\n{out}");
    assert!(out.contains("B-C (closed)"));
    assert!(out.contains("Occlusion: 135.0"), "unexpected occlusion in:\n{out}");
}

#[test]
fn route_with_door_opened_is_clear() {
    let output = run(&["route", "corridor", "1", "3", "--open", "11", "--json"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["reachable"], true);
    assert_eq!(report["occlusion"], 0.0);
    assert_eq!(report["hops"], 2);
}

#[test]
fn route_portal_offset_skips_first_closed_door() {
    let output = run(&["route", "corridor", "A", "C", "--portal-offset", "1", "--json"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["occlusion"], 0.0);
}

#[test]
fn route_unknown_zone_fails() {
    let output = run(&["route", "corridor", "A", "Attic"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Attic"));
}

// ---------------------------------------------------------------------------
// `roomtone validate`
// ---------------------------------------------------------------------------

const GOOD_SCENE: &str = r#"
name = "Shed"

[[zones]]
id = 1
name = "Inside"
min = [0.0, 0.0, 0.0]
max = [3.0, 2.5, 3.0]

[[connectors]]
id = 1
name = "door"
zone_a = 1
position = [3.0, 1.0, 1.5]
"#;

const BAD_SCENE: &str = r#"
name = "Broken"

[[zones]]
id = 1
name = "A"
min = [0.0, 0.0, 0.0]
max = [3.0, 2.5, 3.0]

[[zones]]
id = 1
name = "B"
min = [4.0, 0.0, 0.0]
max = [6.0, 2.5, 3.0]

[[connectors]]
id = 1
name = "door"
zone_a = 1
zone_b = 9
position = [3.5, 1.0, 1.5]
"#;

#[test]
fn validate_accepts_good_scene() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shed.toml");
    fs::write(&path, GOOD_SCENE).unwrap();

    let output = run(&["validate", path.to_str().unwrap()]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("OK"));
    assert!(out.contains("synthesized"));
}

#[test]
fn validate_lists_every_problem() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, BAD_SCENE).unwrap();

    let output = run(&["validate", path.to_str().unwrap()]);
    assert!(!output.status.success());

    let out = stdout(&output);
    assert!(out.contains("2 problem(s)"), "unexpected report:\n{out}");
}

#[test]
fn scene_files_work_everywhere_a_name_does() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shed.toml");
    fs::write(&path, GOOD_SCENE).unwrap();

    let output = run(&["inspect", path.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Scene: Shed"));
}

// ---------------------------------------------------------------------------
// `roomtone simulate`
// ---------------------------------------------------------------------------

fn json_rows(output: &Output) -> Vec<serde_json::Value> {
    stdout(output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn simulate_emits_one_json_row_per_tick() {
    let output = run(&["simulate", "corridor", "--ticks", "3", "--json"]);
    assert!(output.status.success());

    let rows = json_rows(&output);
    assert_eq!(rows.len(), 3);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row["tick"], i as u64);
    }
    assert_eq!(rows[0]["cache_misses"], 1);
    let heard = &rows[0]["heard"][0];
    assert_eq!(heard["listener"], "player");
    assert_eq!(heard["emitter"], "radio");
    assert_eq!(heard["occlusion"], 135.0);
}

#[test]
fn simulate_toggle_opens_door() {
    let output = run(&[
        "simulate", "corridor", "--ticks", "3", "--json", "--toggle", "11@1",
    ]);
    assert!(output.status.success());

    let rows = json_rows(&output);
    assert_eq!(rows[0]["heard"][0]["occlusion"], 135.0);
    assert_eq!(rows[2]["heard"][0]["occlusion"], 0.0);
}

#[test]
fn simulate_text_reports_zone_entries() {
    let output = run(&["simulate", "apartment", "--ticks", "2"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("player entered"));
    assert!(out.contains("Ran 2 ticks"));
}

#[test]
fn simulate_unknown_scene_fails() {
    let output = run(&["simulate", "lighthouse"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}
