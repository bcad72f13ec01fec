//! cli.rs
//!
//! Runs the `covenant` binary against contracts written to a temp dir.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{json, Value};
use tempfile::TempDir;

const IDL: &str = r#"[
  {"type": "meta", "checksum": "feedbeef"},
  {"type": "enum", "name": "Color", "values": ["RED", "GREEN"]},
  {"type": "struct", "name": "Shape", "fields": [{"name": "color", "type": "Color"}]},
  {"type": "struct", "name": "Circle", "extends": "Shape", "fields": [
    {"name": "radius", "type": "float"}
  ]},
  {"type": "interface", "name": "Canvas", "functions": [
    {"name": "draw", "params": [{"name": "shape", "type": "Circle"}], "returns": {"type": "bool"}},
    {"name": "count", "params": [], "returns": {"type": "int"}}
  ]}
]"#;

fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let p = dir.path().join(name);
    fs::write(&p, body).unwrap();
    p
}

fn covenant() -> Command {
    Command::cargo_bin("covenant").unwrap()
}

fn json_stdout(cmd: &mut Command) -> (bool, Value) {
    let out = cmd.output().unwrap();
    let v = serde_json::from_slice(&out.stdout).unwrap();
    (out.status.success(), v)
}

fn idl(dir: &TempDir) -> PathBuf {
    write(dir, "idl.json", IDL)
}

fn arg(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn inspect_lists_catalog() {
    let dir = TempDir::new().unwrap();
    let idl = idl(&dir);

    let (ok, v) = json_stdout(covenant().args(["--json", "inspect", arg(&idl)]));
    assert!(ok);
    assert_eq!(v["checksum"], json!("feedbeef"));
    assert_eq!(v["interfaces"][0]["name"], json!("Canvas"));

    let circle = v["structs"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == json!("Circle"))
        .unwrap();
    let fields: Vec<&str> = circle["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["radius", "color"]);
}

#[test]
fn inspect_fails_on_cyclic_contract() {
    let dir = TempDir::new().unwrap();
    let idl = write(
        &dir,
        "cycle.json",
        r#"[{"type":"struct","name":"A","extends":"A","fields":[]}]"#,
    );
    covenant().args(["inspect", arg(&idl)]).assert().failure();
}

#[test]
fn validate_accepts_and_rejects() {
    let dir = TempDir::new().unwrap();
    let idl = idl(&dir);

    let (ok, v) = json_stdout(covenant().args([
        "--json",
        "validate",
        arg(&idl),
        "--type",
        "Circle",
        r#"{"color":"RED","radius":2,"extra":1}"#,
    ]));
    assert!(ok);
    assert_eq!(v["value"], json!({"radius": 2.0, "color": "RED"}));

    let (ok, v) = json_stdout(covenant().args([
        "--json",
        "validate",
        arg(&idl),
        "--type",
        "int",
        "--array-depth",
        "1",
        "--response",
        "[1, \"2\"]",
    ]));
    assert!(!ok);
    assert_eq!(v["error"]["code"], json!(-32001));
    assert_eq!(v["error"]["message"], json!("[1]: expected int, got string"));
}

#[test]
fn declared_depth_beyond_limit_fails() {
    let dir = TempDir::new().unwrap();
    let deep = write(
        &dir,
        "deep.json",
        r#"[{"type":"struct","name":"S","fields":[{"name":"x","type":"int","array_depth":50000000}]}]"#,
    );
    let out = covenant().args(["inspect", arg(&deep)]).output().unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("array levels"));

    let idl = idl(&dir);
    let out = covenant()
        .args(["validate", arg(&idl), "--type", "int", "--array-depth", "50000000", "[]"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("exceeds limit 128"));
}

#[test]
fn validate_reads_value_from_file() {
    let dir = TempDir::new().unwrap();
    let idl = idl(&dir);
    let value = write(&dir, "value.json", r#""BLUE""#);
    let at = format!("@{}", arg(&value));

    let (ok, v) = json_stdout(covenant().args(["--json", "validate", arg(&idl), "--type", "Color", &at]));
    assert!(!ok);
    assert!(v["error"]["message"].as_str().unwrap().contains("RED, GREEN"));
}

#[test]
fn check_request_reports_each_call() {
    let dir = TempDir::new().unwrap();
    let idl = idl(&dir);
    let req = write(
        &dir,
        "req.json",
        r#"[
          {"jsonrpc":"2.0","method":"Canvas.draw","params":[{"color":"GREEN","radius":1.5}],"id":1},
          {"jsonrpc":"2.0","method":"Canvas.erase","params":[],"id":2},
          {"jsonrpc":"2.0","method":"Canvas.count","params":[1],"id":3}
        ]"#,
    );

    let (ok, v) = json_stdout(covenant().args(["--json", "check-request", arg(&idl), arg(&req)]));
    assert!(!ok);
    assert_eq!(v["batch"], json!(true));
    assert_eq!(v["calls"][0]["ok"], json!(true));
    assert_eq!(v["calls"][1]["error"]["code"], json!(-32601));
    assert_eq!(v["calls"][2]["error"]["code"], json!(-32602));
}

#[test]
fn config_limits_apply() {
    let dir = TempDir::new().unwrap();
    let idl = idl(&dir);
    let cfg = write(&dir, "cfg.json", r#"{"core":{"limits":{"max_schema_bytes":16}}}"#);

    covenant()
        .args(["--config", arg(&cfg), "inspect", arg(&idl)])
        .assert()
        .failure();

    let bad = write(&dir, "bad.json", r#"{"max_batch_size":0}"#);
    covenant()
        .args(["--config", arg(&bad), "inspect", arg(&idl)])
        .assert()
        .failure();
}
