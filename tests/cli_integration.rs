//! Testes de integração para a CLI do Noema.

use std::path::Path;
use std::process::Output;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Binário isolado: diretório atual e diretório de config do usuário
/// apontam para `dir`.
fn noema_in(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_noema"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    noema_in(dir)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_version_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    noema_in(temp_dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "noema {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_help_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    noema_in(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("serve"))
                .and(predicate::str::contains("config"))
                .and(predicate::str::contains("doctor"))
                .and(predicate::str::contains("recognize"))
                .and(predicate::str::contains("reason"))
                .and(predicate::str::contains("atoms")),
        );
}

#[test]
fn test_invalid_command() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    noema_in(temp_dir.path()).arg("teleport").assert().failure();
}

#[test]
fn test_verbose_and_quiet_conflict() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    noema_in(temp_dir.path()).args(["-v", "version"]).assert().success();
    noema_in(temp_dir.path()).args(["-q", "version"]).assert().success();
    noema_in(temp_dir.path())
        .args(["-v", "-q", "version"])
        .assert()
        .failure();
}

#[test]
fn test_missing_explicit_config_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    noema_in(temp_dir.path())
        .args(["--config", "absent.toml", "atoms", "count"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}

mod workspace_tests {
    use super::*;

    fn initialized() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output = run(temp_dir.path(), &["init"]);
        assert!(output.status.success(), "init failed: {:?}", output);
        temp_dir
    }

    #[test]
    fn test_init_creates_layout() {
        let temp_dir = initialized();

        assert!(temp_dir.path().join("noema.toml").exists());
        assert!(temp_dir.path().join(".noema").is_dir());
        let gitignore = std::fs::read_to_string(temp_dir.path().join(".gitignore")).unwrap();
        assert!(gitignore.contains(".noema/"));

        // Segunda execução não sobrescreve
        let again = run(temp_dir.path(), &["init"]);
        assert!(again.status.success());
        assert!(stdout(&again).contains("already exists"));
    }

    #[test]
    fn test_atoms_persist_between_runs() {
        let temp_dir = initialized();
        let dir = temp_dir.path();

        let added = run(
            dir,
            &["atoms", "add", r#"{"id":"cat","type":"ConceptNode","name":"cat"}"#],
        );
        assert!(added.status.success());
        assert_eq!(stdout(&added).trim(), "cat");
        assert!(dir.join(".noema").join("atoms.json").exists());

        let count = run(dir, &["atoms", "count"]);
        assert_eq!(stdout(&count).trim(), "1");

        let listed = run(dir, &["atoms", "list", "--type", "ConceptNode"]);
        let atoms: Value = serde_json::from_str(&stdout(&listed)).unwrap();
        assert_eq!(atoms[0]["id"], "cat");

        let removed = run(dir, &["atoms", "remove", "cat"]);
        assert!(stdout(&removed).contains("Removed: cat"));
        assert_eq!(stdout(&run(dir, &["atoms", "count"])).trim(), "0");
    }

    #[test]
    fn test_reason_over_snapshot() {
        let temp_dir = initialized();
        let dir = temp_dir.path();

        run(
            dir,
            &[
                "atoms",
                "add",
                r#"{"type":"ConceptNode","name":"rain","truthValue":{"strength":0.9,"confidence":0.8}}"#,
            ],
        );
        run(
            dir,
            &[
                "atoms",
                "add",
                r#"{"type":"ImplicationLink","outgoing":[{"type":"ConceptNode","name":"rain"},{"type":"ConceptNode","name":"wet"}],"truthValue":{"strength":0.8,"confidence":0.9}}"#,
            ],
        );

        let output = run(dir, &["reason", "--type", "deductive"]);
        assert!(output.status.success());

        let result: Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(result["conclusion"][0]["name"], "wet");
        assert_eq!(result["metadata"]["reasoningType"], "deductive");
    }

    #[test]
    fn test_recognize_json_sequence() {
        let temp_dir = initialized();
        let output = run(temp_dir.path(), &["recognize", "--json", "[1,3,5,7,9,11]"]);
        assert!(output.status.success());

        let patterns: Value = serde_json::from_str(&stdout(&output)).unwrap();
        let names: Vec<&str> = patterns
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p["pattern"]["name"].as_str())
            .collect();
        assert!(names.contains(&"arithmetic-sequence"), "{:?}", names);
    }

    #[test]
    fn test_export_and_import() {
        let temp_dir = initialized();
        let dir = temp_dir.path();

        run(dir, &["atoms", "add", r#"{"id":"a","type":"ConceptNode","name":"a"}"#]);
        let exported = run(dir, &["export", "-o", "backup.json"]);
        assert!(exported.status.success());
        assert!(dir.join("backup.json").exists());

        run(dir, &["atoms", "clear"]);
        assert_eq!(stdout(&run(dir, &["atoms", "count"])).trim(), "0");

        let imported = run(dir, &["import", "-i", "backup.json"]);
        assert!(stdout(&imported).contains("Import complete: 1 atoms"));
        assert_eq!(stdout(&run(dir, &["atoms", "count"])).trim(), "1");
    }

    #[test]
    fn test_import_rejects_malformed_file() {
        let temp_dir = initialized();
        let dir = temp_dir.path();

        run(dir, &["atoms", "add", r#"{"id":"keep","type":"ConceptNode"}"#]);
        std::fs::write(dir.join("bad.json"), r#"{"not":"an array"}"#).unwrap();

        let output = run(dir, &["import", "-i", "bad.json"]);
        assert!(!output.status.success());
        assert_eq!(stdout(&run(dir, &["atoms", "count"])).trim(), "1");
    }

    #[test]
    fn test_doctor_on_fresh_workspace() {
        let temp_dir = initialized();
        let output = run(temp_dir.path(), &["doctor"]);

        assert!(output.status.success());
        assert!(stdout(&output).contains("Configuration loaded"));
    }
}
