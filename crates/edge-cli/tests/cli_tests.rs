//! CLI integration tests for edge-cli
//!
//! Tests command parsing, output formatting, and config handling. Nothing
//! here needs a node: network commands are pointed at a closed port.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// First signer of the `hedera_local` profile
const HEDERA_LOCAL_KEY: &str = "105d050185ccb907fba04dd92d8de9e32c18305e097ab41dadda21489a211524";

/// Nothing listens here
const DEAD_RPC: &str = "http://127.0.0.1:1";

/// Helper to run the CLI with `home` as the home directory
fn run_edge(home: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_evm-edge"))
        .args(args)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ==================== Help & Version Tests ====================

#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("evm-edge"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("list"));
    assert!(stdout.contains("networks"));
    assert!(stdout.contains("query"));
}

#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("evm-edge"));
}

#[test]
fn test_cli_run_help() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["run", "--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--suite"));
    assert!(stdout.contains("--include-pending"));
    assert!(stdout.contains("--fail-fast"));
}

// ==================== List & Networks Tests ====================

#[test]
fn test_list() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("low-level-call"));
    assert!(stdout.contains("custom-error"));
    assert!(stdout.contains("(pending)"));
}

#[test]
fn test_list_json() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["--json", "list"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    let suites = json["suites"].as_array().unwrap();
    assert_eq!(suites.len(), 10);
    let errors = suites.iter().find(|s| s["id"] == "errors").unwrap();
    let assert_case = errors["cases"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == "assert")
        .unwrap();
    assert_eq!(assert_case["pending"], true);
}

#[test]
fn test_networks_json() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["--json", "networks"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    let networks = json["networks"].as_array().unwrap();
    let names: Vec<_> = networks.iter().map(|n| n["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["hedera_local", "hedera_testnet", "besu_local"]);
    assert_eq!(networks[0]["chain_id"], 298);
    assert_eq!(networks[0]["default"], true);
    assert_eq!(networks[1]["default_gas_limit"], Value::Null);
    assert_eq!(networks[2]["url"], "http://127.0.0.1:8544");
}

#[test]
fn test_networks_never_print_keys() {
    let home = tempfile::tempdir().unwrap();
    for args in [&["networks"][..], &["--json", "networks"][..]] {
        let output = run_edge(home.path(), args);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.contains(HEDERA_LOCAL_KEY));
    }
}

#[test]
fn test_global_rpc_url_flag() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(
        home.path(),
        &[
            "--json",
            "--network",
            "besu_local",
            "--rpc-url",
            "http://node:9999",
            "networks",
        ],
    );
    assert!(output.status.success());
    let json = stdout_json(&output);
    let besu = json["networks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["name"] == "besu_local")
        .unwrap()
        .clone();
    assert_eq!(besu["url"], "http://node:9999");
    assert_eq!(besu["default"], true);
}

// ==================== Config Tests ====================

#[test]
fn test_config_show_defaults() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["--json", "config", "--show"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["network"], "hedera_local");
    assert_eq!(json["artifacts_dir"], "artifacts");
}

#[test]
fn test_config_set_network_persists() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["config", "--set-network", "besu_local"]);
    assert!(output.status.success());
    assert!(home.path().join(".evm-edge/config.toml").exists());

    let output = run_edge(home.path(), &["--json", "config", "--show"]);
    assert_eq!(stdout_json(&output)["network"], "besu_local");
}

#[test]
fn test_config_set_unknown_network() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["--json", "config", "--set-network", "nowhere"]);
    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("nowhere"));
    assert!(!home.path().join(".evm-edge/config.toml").exists());
}

#[test]
fn test_config_file_overrides() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join(".evm-edge");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        r#"
network = "devnet"

[networks.devnet]
url = "http://10.1.1.1:8545"
chain_id = 31337
"#,
    )
    .unwrap();

    let output = run_edge(home.path(), &["--json", "networks"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    let devnet = json["networks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["name"] == "devnet")
        .unwrap()
        .clone();
    assert_eq!(devnet["chain_id"], 31337);
    assert_eq!(devnet["source"], "config");
    assert_eq!(devnet["default"], true);
}

// ==================== Error Tests ====================

#[test]
fn test_run_unknown_suite() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["--rpc-url", DEAD_RPC, "run", "--suite", "nope"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown suite: nope"));
}

#[test]
fn test_run_unreachable_node() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["--json", "--rpc-url", DEAD_RPC, "run"]);
    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("Cannot reach network hedera_local"));
}

#[test]
fn test_query_unreachable_node() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["--rpc-url", DEAD_RPC, "query", "chain-id"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_query_invalid_address() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["--rpc-url", DEAD_RPC, "query", "balance", "0x1234"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid address"));
}

#[test]
fn test_unknown_network() {
    let home = tempfile::tempdir().unwrap();
    let output = run_edge(home.path(), &["--network", "nowhere", "query", "chain-id"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown network: nowhere"));
}
