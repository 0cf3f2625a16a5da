#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use rusqlite::Connection;
use serde_json::Value;
use tempfile::TempDir;

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let db = dir.path().join("hotel.db");
    Connection::open(&db)
        .expect("open fixture db")
        .execute_batch(
            "CREATE TABLE guests (id INTEGER, name TEXT);
             INSERT INTO guests VALUES (1, 'Ada');",
        )
        .expect("seed demo data");
    let config = dir.path().join("conf").join("csvbridge.toml");
    (dir, db, config)
}

fn csvbridge(dir: &Path, config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("csvbridge");
    cmd.current_dir(dir)
        .env("CSVBRIDGE_CONFIG", config)
        .env_remove("CSVBRIDGE_DATABASE")
        .env_remove("CSVBRIDGE_PROFILE")
        .env_remove("CSVBRIDGE_LOG_FILE")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut assert_cmd::Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8_lossy(&output).into_owned()
}

#[test]
fn saved_default_profile_supplies_the_database() {
    let (dir, db, config) = setup();

    csvbridge(dir.path(), &config)
        .args(["profile", "save", "hotel", "--db", db.to_str().unwrap()])
        .args(["--sync", "normal", "--default"])
        .assert()
        .success();
    assert!(config.exists());
    let text = fs::read_to_string(&config).unwrap();
    assert!(text.contains("default_profile = \"hotel\""));
    assert!(text.contains("[profiles.hotel]"));
    assert!(text.contains("synchronous = \"normal\""));

    let stdout = stdout_of(csvbridge(dir.path(), &config).args(["list", "guests"]));
    assert_eq!(stdout.trim(), "(1, 'Ada')");
}

#[test]
fn profile_list_as_json() {
    let (dir, db, config) = setup();
    csvbridge(dir.path(), &config)
        .args(["profile", "save", "hotel", "--db", db.to_str().unwrap()])
        .assert()
        .success();
    csvbridge(dir.path(), &config)
        .args(["profile", "save", "scratch", "--db", "scratch.db"])
        .args(["--create-if-missing", "true"])
        .assert()
        .success();

    let stdout = stdout_of(
        csvbridge(dir.path(), &config).args(["--format", "json", "profile", "list"]),
    );
    let json: Value = serde_json::from_str(&stdout).expect("valid json");
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["hotel", "scratch"]);
    assert_eq!(json[1]["create_if_missing"], true);
    assert_eq!(json[0]["synchronous"], Value::Null);
}

#[test]
fn explicit_database_overrides_the_profile() {
    let (dir, db, config) = setup();
    csvbridge(dir.path(), &config)
        .args(["profile", "save", "broken", "--db", "nowhere.db", "--default"])
        .assert()
        .success();

    csvbridge(dir.path(), &config)
        .args(["list", "guests"])
        .assert()
        .failure()
        .code(1);

    let stdout = stdout_of(
        csvbridge(dir.path(), &config).args(["--database", db.to_str().unwrap(), "list", "guests"]),
    );
    assert!(stdout.contains("(1, 'Ada')"));
}

#[test]
fn unknown_profile_is_an_error() {
    let (dir, db, config) = setup();
    let output = csvbridge(dir.path(), &config)
        .args(["--profile", "ghost", "--database", db.to_str().unwrap(), "list", "guests"])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&output).contains("profile 'ghost' not found"));
}

#[test]
fn profile_create_flag_creates_missing_database() {
    let (dir, _db, config) = setup();
    let fresh = dir.path().join("fresh").join("new.db");
    csvbridge(dir.path(), &config)
        .args(["profile", "save", "fresh", "--db", fresh.to_str().unwrap()])
        .args(["--create-if-missing", "true"])
        .assert()
        .success();

    csvbridge(dir.path(), &config)
        .args(["--profile", "fresh", "list", "sqlite_master"])
        .assert()
        .success();
    assert!(fresh.exists());
}

#[test]
fn delete_and_clear_default() {
    let (dir, db, config) = setup();
    csvbridge(dir.path(), &config)
        .args(["profile", "save", "hotel", "--db", db.to_str().unwrap(), "--default"])
        .assert()
        .success();

    csvbridge(dir.path(), &config)
        .args(["profile", "default"])
        .assert()
        .success();
    assert!(!fs::read_to_string(&config).unwrap().contains("default_profile"));

    csvbridge(dir.path(), &config)
        .args(["profile", "default", "ghost"])
        .assert()
        .failure()
        .code(1);

    csvbridge(dir.path(), &config)
        .args(["profile", "delete", "hotel"])
        .assert()
        .success();
    assert!(!fs::read_to_string(&config).unwrap().contains("hotel"));

    csvbridge(dir.path(), &config)
        .args(["profile", "delete", "hotel"])
        .assert()
        .failure();
}

#[test]
fn config_file_supplies_database_and_log_file() {
    let (dir, db, config) = setup();
    fs::create_dir_all(config.parent().unwrap()).unwrap();
    fs::write(
        &config,
        format!(
            "[database]\ndefault = {:?}\n\n[logging]\nfile = \"bridge.log\"\n",
            db.to_str().unwrap()
        ),
    )
    .unwrap();

    let stdout = stdout_of(csvbridge(dir.path(), &config).args(["list", "guests"]));
    assert!(stdout.contains("(1, 'Ada')"));
    assert!(dir.path().join("bridge.log").exists());
    assert!(!dir.path().join("csvbridge.log").exists());
}

#[test]
fn malformed_config_is_reported() {
    let (dir, db, config) = setup();
    fs::create_dir_all(config.parent().unwrap()).unwrap();
    fs::write(&config, "[profiles.bad]\nsynchronous = \"sometimes\"\n").unwrap();

    let output = csvbridge(dir.path(), &config)
        .args(["--database", db.to_str().unwrap(), "list", "guests"])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&output).contains("synchronous value 'sometimes' is invalid"));
}
