//! Integration tests for profilemap
//!
//! Library-level mapping from connection files, and the `pm` binary end to end.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use profilemap::{Connection, Profile, ProfileError, get_automatic_profile_mapping};
use serde_json::json;
use tempfile::TempDir;

const REDSHIFT_CONN: &str = r#"
conn_id: redshift_default
conn_type: redshift
host: db.x
login: u
password: p
schema: s
extra: '{"sslmode": "require", "region": "us-east-1"}'
"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

/// Temp dir with an empty config so no user config leaks into the run
fn workspace() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = write(temp.path(), "profilemap.yml", "{}\n");
    (temp, config)
}

fn pm(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pm").expect("pm binary not built");
    cmd.arg("--config").arg(config);
    cmd
}

// =============================================================================
// Library
// =============================================================================

#[test]
fn test_connection_file_to_profile() {
    let conn: Connection = serde_yaml::from_str(REDSHIFT_CONN).unwrap();
    let mapping = get_automatic_profile_mapping(&conn, Profile::new()).unwrap();
    let profile = mapping.profile().unwrap();

    assert_eq!(profile.get_str("type"), Some("redshift"));
    assert_eq!(profile.get_str("host"), Some("db.x"));
    assert_eq!(profile.get_str("user"), Some("u"));
    assert_eq!(profile.get("port"), Some(&json!(5439)));
    assert_eq!(profile.get_str("dbname"), Some("s"));
    assert_eq!(profile.get_str("schema"), Some("s"));
    assert_eq!(profile.get_str("sslmode"), Some("require"));
    assert_eq!(profile.get_str("region"), Some("us-east-1"));
    assert!(!profile.contains_key("timeout"));
    assert_ne!(profile.get_str("password"), Some("p"));
}

#[test]
fn test_json_connection_with_malformed_extra() {
    let json = r#"{"conn_id": "rs", "conn_type": "redshift", "host": "db.x", "login": "u",
                   "password": "p", "schema": "s", "port": 5440, "extra": "{oops"}"#;
    let conn: Connection = serde_yaml::from_str(json).unwrap();
    let profile = get_automatic_profile_mapping(&conn, Profile::new())
        .unwrap()
        .profile()
        .unwrap();

    assert_eq!(profile.get("port"), Some(&json!(5440)));
    assert!(!profile.contains_key("sslmode"));
}

#[test]
fn test_unclaimed_connection() {
    let conn = Connection::new("mystery", "oracle").with_host("h");
    let err = get_automatic_profile_mapping(&conn, Profile::new()).unwrap_err();
    assert!(matches!(err, ProfileError::NoMappingFound { .. }));
}

// =============================================================================
// CLI
// =============================================================================

#[test]
fn test_cli_profile_to_stdout() {
    let (temp, config) = workspace();
    let conn = write(temp.path(), "conn.yml", REDSHIFT_CONN);

    let output = pm(&config)
        .args(["profile"])
        .arg(&conn)
        .args(["--arg", "threads=4", "--target-name", "prod"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["default"]["target"].as_str(), Some("prod"));
    let out = &parsed["default"]["outputs"]["prod"];
    assert_eq!(out["type"].as_str(), Some("redshift"));
    assert_eq!(out["threads"].as_u64(), Some(4));
    assert_eq!(
        out["password"].as_str(),
        Some("{{ env_var('COSMOS_CONN_REDSHIFT_PASSWORD') }}")
    );
}

#[test]
fn test_cli_profile_to_file_with_config_defaults() {
    let temp = TempDir::new().unwrap();
    let config = write(
        temp.path(),
        "profilemap.yml",
        "profile-name: jaffle_shop\nenv-var-prefix: DBT_ENV_SECRET\n",
    );
    let conn = write(temp.path(), "conn.yml", REDSHIFT_CONN);
    let out_path = temp.path().join("profiles.yml");

    pm(&config)
        .arg("profile")
        .arg(&conn)
        .arg("--output")
        .arg(&out_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&out_path).unwrap();
    assert!(written.starts_with("jaffle_shop:"));
    assert!(written.contains("DBT_ENV_SECRET_REDSHIFT_PASSWORD"));
    assert!(written.contains("target: dev"));
}

#[test]
fn test_cli_profile_missing_required_fails() {
    let (temp, config) = workspace();
    let conn = write(
        temp.path(),
        "conn.yml",
        "conn_id: rs\nconn_type: redshift\nhost: db.x\nlogin: u\npassword: p\n",
    );

    pm(&config)
        .args(["profile", "--mapping", "redshift_user_password"])
        .arg(&conn)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required fields: dbname, schema"));
}

#[test]
fn test_cli_profile_mock_skips_validation() {
    let (temp, config) = workspace();
    let conn = write(temp.path(), "conn.yml", "conn_id: rs\nconn_type: redshift\n");

    pm(&config)
        .args(["profile", "--mapping", "redshift_user_password", "--mock"])
        .arg(&conn)
        .assert()
        .success()
        .stdout(predicate::str::contains("mock_value").and(predicate::str::contains("port: 5439")));
}

#[test]
fn test_cli_null_overrides_keep_connection_values() {
    let (temp, config) = workspace();
    let conn = write(temp.path(), "conn.yml", REDSHIFT_CONN);

    let output = pm(&config)
        .arg("profile")
        .arg(&conn)
        .args(["--arg", "host=null", "--arg", "type=~"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    let out = &parsed["default"]["outputs"]["dev"];
    assert_eq!(out["host"].as_str(), Some("db.x"));
    assert_eq!(out["type"].as_str(), Some("redshift"));
}

#[test]
fn test_cli_rejects_secret_override() {
    let (temp, config) = workspace();
    let conn = write(temp.path(), "conn.yml", REDSHIFT_CONN);

    pm(&config)
        .args(["profile", "--mapping", "redshift_user_password", "--arg", "password=leak"])
        .arg(&conn)
        .assert()
        .failure()
        .stdout(predicate::str::contains("leak").not());
}

#[test]
fn test_cli_env() {
    let (temp, config) = workspace();
    let conn = write(temp.path(), "conn.yml", REDSHIFT_CONN);

    pm(&config)
        .arg("env")
        .arg(&conn)
        .assert()
        .success()
        .stdout("COSMOS_CONN_REDSHIFT_PASSWORD=p\n");
}

#[test]
fn test_cli_check() {
    let (temp, config) = workspace();
    let conn = write(temp.path(), "conn.yml", REDSHIFT_CONN);
    let orphan = write(temp.path(), "orphan.yml", "conn_id: x\nconn_type: oracle\n");

    pm(&config)
        .arg("check")
        .arg(&conn)
        .assert()
        .success()
        .stdout(predicate::str::contains("redshift_user_password"));

    pm(&config)
        .arg("check")
        .arg(&orphan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No profile mapping can claim"));
}

#[test]
fn test_cli_list_verbose() {
    let (_temp, config) = workspace();

    pm(&config)
        .args(["list", "--verbose"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("redshift_user_password")
                .and(predicate::str::contains("postgres_user_password"))
                .and(predicate::str::contains("extra.sslmode")),
        );
}
