//! Integration tests for the tplfold driver and binary

use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tplfold::{load_program, report, run, write_changes};
use tplfold_core::{Config, TransformKind};

const VIEW: &str = "const view = { template: '<' + TAG + '>' + `${Css.Row}` };\n";
const CONSTANTS: &str = "const TAG = 'main';\nenum Css { Row = 'row' }\n";

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::create_dir_all(dir.path().join("node_modules/lib")).unwrap();
    fs::write(dir.path().join("src/view.ts"), VIEW).unwrap();
    fs::write(dir.path().join("src/constants.ts"), CONSTANTS).unwrap();
    fs::write(
        dir.path().join("node_modules/lib/index.js"),
        "module.exports = { template: 'a' + 'b' };\n",
    )
    .unwrap();
    dir
}

fn tplfold(cwd: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tplfold"))
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_run_folds_across_files() {
    let dir = project();
    let units = run(&[dir.path().to_path_buf()], &Config::default()).unwrap();

    let paths: Vec<PathBuf> = units.iter().map(|unit| unit.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            dir.path().join("src/constants.ts"),
            dir.path().join("src/view.ts"),
        ]
    );
    assert!(!units[0].is_changed());
    assert_eq!(
        units[1].source,
        "const view = { template: \"<main>row\" };\n"
    );
}

#[test]
fn test_write_changes_only_touches_changed_files() {
    let dir = project();
    let units = run(&[dir.path().join("src")], &Config::default()).unwrap();

    assert_eq!(write_changes(&units).unwrap(), 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("src/view.ts")).unwrap(),
        "const view = { template: \"<main>row\" };\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("src/constants.ts")).unwrap(),
        CONSTANTS
    );

    // A second pass finds nothing left to fold
    let again = run(&[dir.path().join("src")], &Config::default()).unwrap();
    assert!(again.iter().all(|unit| !unit.is_changed()));
    assert_eq!(report::Totals::of(&again).unchanged, 1);
}

#[test]
fn test_configured_transform_is_applied() {
    let dir = project();
    let mut config = Config::default();
    config.rewrite.transform = TransformKind::Uppercase;

    let units = run(&[dir.path().join("src/view.ts"), dir.path().join("src/constants.ts")], &config)
        .unwrap();
    let view = units
        .iter()
        .find(|unit| unit.path.ends_with("view.ts"))
        .unwrap();
    assert_eq!(view.source, "const view = { template: \"<MAIN>ROW\" };\n");
}

#[test]
fn test_load_program_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = load_program(&[dir.path().join("absent.ts")]);
    assert!(result.is_err());
}

#[test]
fn test_binary_check_fails_when_changes_pending() {
    let dir = project();
    let output = tplfold(dir.path(), &["rewrite", "--check", "src"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim(), Path::new("src").join("view.ts").display().to_string());
}

#[test]
fn test_binary_write_then_check_passes() {
    let dir = project();

    let output = tplfold(dir.path(), &["rewrite", "--write", "src"]);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("src/view.ts")).unwrap(),
        "const view = { template: \"<main>row\" };\n"
    );

    let output = tplfold(dir.path(), &["rewrite", "--check", "src"]);
    assert!(output.status.success());
}

#[test]
fn test_binary_reads_local_config_file() {
    let dir = project();
    fs::write(
        dir.path().join("tplfold.toml"),
        "[rewrite]\nproperty_name = \"markup\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("src/view.ts"),
        "const view = { markup: 'a' + 'b', template: 'c' + 'd' };\n",
    )
    .unwrap();

    let output = tplfold(dir.path(), &["rewrite", "src/view.ts"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "const view = { markup: \"ab\", template: 'c' + 'd' };\n"
    );
}

#[test]
fn test_binary_json_report() {
    let dir = project();
    let output = tplfold(dir.path(), &["report", "--format", "json", "src"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["totals"]["files"], 2);
    assert_eq!(json["totals"]["folded"], 1);
}
