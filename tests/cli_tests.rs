// End-to-end tests for the passvault binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MASTER: &str = "Secret123!";

fn passvault(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("passvault").unwrap();
    cmd.env("PASSVAULT_DIR", temp_dir.path())
        .env("PASSVAULT_PASSWORD", MASTER)
        .env_remove("PASSVAULT_NEW_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn init(temp_dir: &TempDir) {
    passvault(temp_dir)
        .args(["init", "--email", "a@b.com", "--hint", "pet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault created"));
}

fn add(temp_dir: &TempDir, account: &str, login: &str, secret: &str) {
    passvault(temp_dir)
        .args(["add", account, "--login", login, "--stdin"])
        .write_stdin(format!("{secret}\n"))
        .assert()
        .success();
}

#[test]
fn test_generate_json() {
    let temp_dir = TempDir::new().unwrap();
    let output = passvault(&temp_dir)
        .args(["generate", "--length", "24", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["password"].as_str().unwrap().chars().count(), 24);
    assert_eq!(value["strength"], "Excellent");
}

#[test]
fn test_generate_rejects_short_length() {
    let temp_dir = TempDir::new().unwrap();
    passvault(&temp_dir)
        .args(["generate", "--length", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least"));
}

#[test]
fn test_strength_command() {
    let temp_dir = TempDir::new().unwrap();
    passvault(&temp_dir)
        .args(["strength", "aA1!aaaaaaaaaa"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Excellent"));

    passvault(&temp_dir)
        .args(["strength", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Weak"));
}

#[test]
fn test_catalog_lists_services() {
    let temp_dir = TempDir::new().unwrap();
    passvault(&temp_dir)
        .args(["catalog", "--category", "streaming"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Netflix"))
        .stdout(predicate::str::contains("GitHub").not());
}

#[test]
fn test_commands_require_init() {
    let temp_dir = TempDir::new().unwrap();
    passvault(&temp_dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn test_init_twice_fails() {
    let temp_dir = TempDir::new().unwrap();
    init(&temp_dir);
    passvault(&temp_dir)
        .args(["init", "--email", "a@b.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn test_wrong_password_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    init(&temp_dir);
    passvault(&temp_dir)
        .env("PASSVAULT_PASSWORD", "wrong-password")
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid master password"));
}

#[test]
fn test_add_list_search_delete() {
    let temp_dir = TempDir::new().unwrap();
    init(&temp_dir);
    add(&temp_dir, "GitHub", "me@x.com", "p1");
    add(&temp_dir, "Netflix", "family", "Str0ng!Passw0rd");

    let output = passvault(&temp_dir)
        .args(["list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["count"], 2);
    assert_eq!(value["entries"][1]["category"], "Streaming");
    assert!(value["entries"][0].get("secret").is_none());

    passvault(&temp_dir)
        .args(["search", "git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub"))
        .stdout(predicate::str::contains("Netflix").not());

    passvault(&temp_dir)
        .args(["show", "netflix", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Str0ng!Passw0rd"));

    // Bulk delete is all or nothing
    passvault(&temp_dir)
        .args(["delete", "GitHub:me@x.com", "Nope:none", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Entry not found"));

    passvault(&temp_dir)
        .args(["delete", "GitHub:me@x.com", "--yes"])
        .assert()
        .success();

    passvault(&temp_dir)
        .args(["stats", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 1"));
}

#[test]
fn test_duplicate_add_fails() {
    let temp_dir = TempDir::new().unwrap();
    init(&temp_dir);
    add(&temp_dir, "GitHub", "me@x.com", "p1");

    passvault(&temp_dir)
        .args(["add", "github", "--login", "ME@x.com", "--stdin"])
        .write_stdin("p2\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_recover_resets_master_password() {
    let temp_dir = TempDir::new().unwrap();
    init(&temp_dir);
    add(&temp_dir, "GitHub", "me@x.com", "p1");

    passvault(&temp_dir)
        .args(["recover", "--email", "a@b.com", "--hint", "wrong"])
        .env("PASSVAULT_NEW_PASSWORD", "NewPass1!")
        .assert()
        .failure()
        .stderr(predicate::str::contains("do not match"));

    passvault(&temp_dir)
        .args(["recover", "--email", "a@b.com", "--hint", "pet"])
        .env("PASSVAULT_NEW_PASSWORD", "NewPass1!")
        .assert()
        .success()
        .stdout(predicate::str::contains("a@b.com").not());

    passvault(&temp_dir)
        .arg("list")
        .assert()
        .failure();

    passvault(&temp_dir)
        .env("PASSVAULT_PASSWORD", "NewPass1!")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub"));
}

#[test]
fn test_reset_needs_confirmation_when_piped() {
    let temp_dir = TempDir::new().unwrap();
    init(&temp_dir);

    passvault(&temp_dir).arg("reset").assert().failure();
    assert!(temp_dir.path().join("config.json").exists());

    passvault(&temp_dir)
        .args(["reset", "--yes"])
        .assert()
        .success();
    assert!(!temp_dir.path().join("config.json").exists());
}

#[test]
fn test_corrupt_vault_exits_fatal_and_is_untouched() {
    let temp_dir = TempDir::new().unwrap();
    init(&temp_dir);
    let vault_file = temp_dir.path().join("vault.json");
    std::fs::write(&vault_file, "garbage").unwrap();

    passvault(&temp_dir)
        .arg("list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("corrupt"));

    assert_eq!(std::fs::read(&vault_file).unwrap(), b"garbage");
}

#[test]
fn test_show_matches_non_ascii_account_ignoring_case() {
    let temp_dir = TempDir::new().unwrap();
    init(&temp_dir);
    add(&temp_dir, "Ärztekammer", "me", "p1");

    passvault(&temp_dir)
        .args(["show", "ärztekammer", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("p1"));
}
