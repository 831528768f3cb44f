use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;

/// Helper to get a temporary home directory
fn temp_home() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Helper to get config file path in the temp home
fn config_file_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join(".farm-monitor").join("config.json")
}

const BINARY_NAME: &str = "farm-monitor";

/// Address of a local port that was just released, so requests fail fast.
fn unreachable_api() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let addr = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{}", addr)
}

fn farm_monitor(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.env("HOME", home.path()).env_remove("FARM_API_URL");
    cmd
}

#[test]
/// Help command should display usage information.
fn cli_help_displays_usage() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("Command-line arguments"))
        .stdout(contains("watch"))
        .stdout(contains("register"));
}

#[test]
/// Configure should write the chosen values to the config file.
fn configure_creates_config_file() {
    let tmp = temp_home();
    let config_path = config_file_path(&tmp);
    assert!(!config_path.exists());

    farm_monitor(&tmp)
        .args(["configure", "--device-id", "esp8266-42", "--history-hours", "6"])
        .args(["--api-url", "http://gateway.farm:5000"])
        .assert()
        .success()
        .stdout(contains("Configuration saved"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(saved["device_id"], "esp8266-42");
    assert_eq!(saved["history_hours"], 6);
    assert_eq!(saved["api_url"], "http://gateway.farm:5000");
}

#[test]
fn configure_rejects_zero_interval() {
    let tmp = temp_home();
    farm_monitor(&tmp)
        .args(["configure", "--interval-secs", "0"])
        .assert()
        .failure();
    assert!(!config_file_path(&tmp).exists());
}

#[test]
/// Reset command should delete an existing config file.
fn reset_deletes_config_file() {
    let tmp = temp_home();
    let config_path = config_file_path(&tmp);
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    fs::write(&config_path, "{}").unwrap();

    // Ensure the file exists
    assert!(config_path.exists());

    farm_monitor(&tmp).arg("reset").assert().success();

    // Confirm the file was deleted
    assert!(!config_path.exists());
}

#[test]
fn reset_without_config_succeeds() {
    let tmp = temp_home();
    farm_monitor(&tmp).arg("reset").assert().success();
}

#[test]
/// A failed fetch is reported with the view's failure message and a non-zero exit.
fn devices_reports_unreachable_api() {
    let tmp = temp_home();
    farm_monitor(&tmp)
        .args(["devices", "--api-url", unreachable_api().as_str()])
        .assert()
        .failure()
        .stderr(contains("Failed to fetch devices"));
}

#[test]
fn api_url_can_come_from_environment() {
    let tmp = temp_home();
    farm_monitor(&tmp)
        .env("FARM_API_URL", unreachable_api())
        .arg("weather")
        .assert()
        .failure()
        .stderr(contains("Failed to load weather data"));
}

#[test]
#[ignore] // Requires a running farm API on localhost:5000.
fn register_lists_new_device() {
    let tmp = temp_home();
    farm_monitor(&tmp)
        .args(["register", "--device-id", "esp8266-99"])
        .args(["--mac-address", "AA:BB:CC:DD:EE:99"])
        .assert()
        .success()
        .stdout(contains("Device registered"))
        .stdout(contains("esp8266-99"));
}
