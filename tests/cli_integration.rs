use serde_json::{json, Value};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn coinpulse(args: &[&str]) -> Output {
    let binary_path = assert_cmd::cargo::cargo_bin!("coinpulse");
    Command::new(binary_path)
        .args(args)
        .env_remove("TELEGRAM_TOKEN")
        .env_remove("CHANNEL_ID")
        .output()
        .expect("cli run succeeds")
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs() as i64
}

fn stdout_json(output: &Output) -> Value {
    assert!(output.status.success(), "cli exited unsuccessfully: {:?}", output);
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout is utf8");
    serde_json::from_str(&stdout).expect("stdout is valid json")
}

#[test]
fn help_lists_commands_and_options() {
    let output = coinpulse(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout is utf8");
    assert!(stdout.contains("inspect"));
    assert!(stdout.contains("--top-n"));
    assert!(stdout.contains("--cache-file"));
    assert!(stdout.contains("--dry-run"));
}

#[test]
fn inspect_reports_cached_changes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("price_cache.json");
    let now = now();

    let cache = json!({
        "BTCUSDT": [{"t": now - 3_600, "p": 100.0}, {"t": now, "p": 110.0}],
        "ETHUSDT": [{"t": now, "p": 2000.0}]
    });
    std::fs::write(&path, cache.to_string()).expect("write cache");

    let output = coinpulse(&["--cache-file", path.to_str().unwrap(), "inspect"]);
    let reports = stdout_json(&output);
    let reports = reports.as_array().expect("array of reports");
    assert_eq!(reports.len(), 2);

    let btc = &reports[0];
    assert_eq!(btc["symbol"], "BTCUSDT");
    assert_eq!(btc["current_price"], 110.0);
    assert_eq!(btc["change_1h"], 10.0);
    assert_eq!(btc["change_24h"], Value::Null);
    assert_eq!(btc["change_7d"], Value::Null);

    let eth = &reports[1];
    assert_eq!(eth["symbol"], "ETHUSDT");
    assert_eq!(eth["change_1m"], Value::Null);
}

#[test]
fn inspect_filters_symbols() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("price_cache.json");
    let now = now();

    let cache = json!({
        "BTCUSDT": [{"t": now, "p": 42000.0}],
        "ETHUSDT": [{"t": now, "p": 2000.0}]
    });
    std::fs::write(&path, cache.to_string()).expect("write cache");

    let output = coinpulse(&["--cache-file", path.to_str().unwrap(), "inspect", "ethusdt"]);
    let reports = stdout_json(&output);
    assert_eq!(reports.as_array().map(Vec::len), Some(1));
    assert_eq!(reports[0]["symbol"], "ETHUSDT");
}

#[test]
fn inspect_treats_corrupt_cache_as_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("price_cache.json");
    std::fs::write(&path, "{not json").expect("write cache");

    let output = coinpulse(&["--cache-file", path.to_str().unwrap(), "inspect"]);
    assert_eq!(stdout_json(&output), json!([]));
}

#[test]
fn zero_interval_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("price_cache.json");

    let output = coinpulse(&[
        "--cache-file",
        path.to_str().unwrap(),
        "--update-interval",
        "0",
        "--once",
        "--dry-run",
    ]);
    assert!(!output.status.success());
    assert!(!path.exists());
}
