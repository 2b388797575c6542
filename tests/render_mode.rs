//! Integration tests for the sheetlayout binary

use std::path::Path;
use std::process::Command;

const LAYOUT: &str = r#"
[[sheets]]
title = "Inputs"

[[sheets.blocks]]
kind = "col"
id = "rate"
values = [0.2]

[[sheets]]
title = "Calc"

[[sheets.blocks]]
kind = "frame"
table = true

[[sheets.blocks.columns]]
header = "Net"
values = [100, 250]

[[sheets.blocks.columns]]
header = "Gross"
formula = "[Net] * (1 + [rate][0])"
"#;

fn run(dir: &Path, layout: &str, args: &[&str]) -> (String, String, i32) {
    let layout_path = dir.join("book.toml");
    std::fs::write(&layout_path, layout).expect("write layout");
    let config_path = dir.join("config.toml");
    std::fs::write(&config_path, "").expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_sheetlayout"))
        // Tests must not depend on a user's ~/.config/sheetlayout/config.toml.
        .arg("--config")
        .arg(&config_path)
        .args(args)
        .arg(&layout_path)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

#[test]
fn test_dry_run_prints_cells() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run(dir.path(), LAYOUT, &["--dry-run"]);
    assert_eq!(code, 0, "{}", stderr);
    assert!(stdout.contains("== Inputs ==\nA1: 0.2\n"), "{}", stdout);
    assert!(stdout.contains("B2: =A2 * (1 + Inputs!A1)\n"), "{}", stdout);
    assert!(stdout.contains("table Calc A1:B3\n"), "{}", stdout);
    assert!(!dir.path().join("book.xlsx").exists());
}

#[test]
fn test_writes_xlsx_next_to_layout() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run(dir.path(), LAYOUT, &[]);
    assert_eq!(code, 0, "{}", stderr);
    assert!(stdout.starts_with("Wrote "));
    assert!(dir.path().join("book.xlsx").exists());
}

#[test]
fn test_output_flag() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("custom.xlsx");
    let (_, stderr, code) = run(dir.path(), LAYOUT, &["-o", target.to_str().unwrap()]);
    assert_eq!(code, 0, "{}", stderr);
    assert!(target.exists());
}

#[test]
fn test_unresolved_reference_fails() {
    let dir = tempfile::tempdir().unwrap();
    let layout = r#"
[[sheets]]
[[sheets.blocks]]
kind = "row"
values = ["=[missing] + 1"]
"#;
    let (_, stderr, code) = run(dir.path(), layout, &["--dry-run"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Error: "), "{}", stderr);
}

#[test]
fn test_unknown_option() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run(dir.path(), LAYOUT, &["--bogus"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown option: --bogus"));
}

#[test]
fn test_bad_block_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let layout = r#"
[[sheets]]
title = "Data"

[[sheets.blocks]]
kind = "gap"
values = [1]
"#;
    let (_, stderr, code) = run(dir.path(), layout, &["--dry-run"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Sheet Data, block 1: A gap block cannot set values"), "{}", stderr);
}
