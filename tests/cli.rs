use predicates::prelude::*;
use std::{fs, process::Command};
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_repomap")))
}

fn fixture() -> String {
    format!("{}/tests/fixtures/sample", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn map_writes_report() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("maps/MAP.txt");

    cmd()
        .args(["map", "--root", &fixture(), "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Найдено файлов: 2"))
        .stdout(predicate::str::contains("сгенерирована успешно"));

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("# Карта репозитория"));
    assert!(text.contains("TestClass"));
}

#[test]
fn map_respects_existing_report() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("MAP.txt");
    fs::write(&out, "keep me").unwrap();

    cmd()
        .args(["map", "--root", &fixture(), "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
    assert_eq!(fs::read_to_string(&out).unwrap(), "keep me");

    cmd().args(["map", "--root", &fixture(), "--force", "-o"]).arg(&out).assert().success();
    assert_ne!(fs::read_to_string(&out).unwrap(), "keep me");
}

#[test]
fn map_json_and_default_output_name() {
    let dir = TempDir::new().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["map", "--json", "--include", "**/*.py", "--root", &fixture()])
        .assert()
        .success();

    let json = fs::read_to_string(dir.path().join("REPOSITORY_MAP.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v.as_array().map(Vec::len), Some(1));
    assert_eq!(v[0]["path"], "services/user_service.py");
}

#[test]
fn config_file_sets_output() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("app.ts"), "export const A = 1;\n").unwrap();
    fs::write(project.path().join("repomap.toml"), "output = \"docs/MAP.txt\"\n").unwrap();

    cmd()
        .current_dir(project.path())
        .args(["map"])
        .assert()
        .success();
    assert!(project.path().join("docs/MAP.txt").is_file());
}

#[test]
fn manifest_gaps_are_logged() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("neira-app.json"), r#"{ "name": "demo" }"#).unwrap();

    cmd()
        .current_dir(project.path())
        .env_remove("RUST_LOG")
        .args(["map"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Найдено файлов: 0"))
        .stderr(predicate::str::contains("manifest is missing metadata"));
}

#[test]
fn export_rejects_unknown_profile_in_super_project() {
    let root = TempDir::new().unwrap();
    fs::create_dir(root.path().join("neira-core")).unwrap();
    fs::create_dir(root.path().join("neira-cli-mcp")).unwrap();

    cmd()
        .current_dir(root.path())
        .args(["export", "no-such-profile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown export profile `no-such-profile`"));
}

#[test]
fn unknown_subcommand_fails() {
    cmd().arg("frobnicate").assert().failure();
}
