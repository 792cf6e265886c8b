use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn skb_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("skb");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_path = config_dir.join("skb.toml");
    fs::write(
        &config_path,
        r#"[engine]
restore_wait_secs = 0.2

[interface]
sdk_path = "/test/MacOSX.sdk"

[format]
indent_width = 2
"#,
    )
    .unwrap();

    (tmp, config_path)
}

fn run_skb(config: &Path, args: &[&str]) -> Output {
    Command::new(skb_binary())
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("SKB_SDK_PATH")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run skb")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "skb failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn write_fixture(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fixture.json");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_request_cursor_info() {
    let (_tmp, config) = setup_test_env();
    let output = run_skb(
        &config,
        &[
            "request",
            "cursor-info",
            "--file",
            "/src/main.swift",
            "--offset",
            "42",
            "--",
            "-sdk",
            "/sdk",
        ],
    );
    let json = stdout_json(&output);
    assert_eq!(
        json["key.request"],
        serde_json::json!({"$uid": "source.request.cursorinfo"})
    );
    assert_eq!(json["key.sourcefile"], "/src/main.swift");
    assert_eq!(json["key.offset"], 42);
    assert_eq!(json["key.compilerargs"], serde_json::json!(["-sdk", "/sdk"]));
}

#[test]
fn test_request_format_uses_config_defaults() {
    let (_tmp, config) = setup_test_env();
    let output = run_skb(
        &config,
        &["request", "format", "--file", "/src/main.swift", "--line", "3"],
    );
    let json = stdout_json(&output);
    let options = &json["key.editor.format.options"];
    assert_eq!(options["key.editor.format.indentwidth"], 2);
    assert_eq!(options["key.editor.format.tabwidth"], 2);
    assert_eq!(options["key.editor.format.usetabs"], 0);
}

#[test]
fn test_request_format_tab_flags_override_config() {
    let (tmp, _config) = setup_test_env();
    let config = tmp.path().join("tabs.toml");
    fs::write(&config, "[format]\nuse_tabs = true\n").unwrap();

    let base = ["request", "format", "--file", "/src/main.swift", "--line", "1"];
    let usetabs = |extra: &[&str]| {
        let args: Vec<&str> = base.iter().chain(extra).copied().collect();
        stdout_json(&run_skb(&config, &args))["key.editor.format.options"]
            ["key.editor.format.usetabs"]
            .clone()
    };

    assert_eq!(usetabs(&[]), 1);
    assert_eq!(usetabs(&["--no-use-tabs"]), 0);
    assert_eq!(usetabs(&["--no-use-tabs", "--use-tabs"]), 1);
}

#[test]
fn test_request_interface_uses_configured_sdk() {
    let (_tmp, config) = setup_test_env();
    let output = run_skb(
        &config,
        &["request", "interface", "--file", "/h/Foo.h", "--name", "iface-1"],
    );
    let json = stdout_json(&output);
    assert_eq!(json["key.name"], "iface-1");
    assert_eq!(
        json["key.compilerargs"],
        serde_json::json!(["-x", "objective-c", "/h/Foo.h", "-isysroot", "/test/MacOSX.sdk"])
    );
}

#[test]
fn test_sdk_path_env_override() {
    let (_tmp, config) = setup_test_env();
    let output = Command::new(skb_binary())
        .arg("--config")
        .arg(&config)
        .args(["request", "interface", "--file", "/h/Foo.h"])
        .env("SKB_SDK_PATH", "/env/sdk")
        .output()
        .expect("Failed to run skb");
    let json = stdout_json(&output);
    assert_eq!(json["key.compilerargs"][4], "/env/sdk");
    assert!(!json["key.name"].as_str().unwrap().is_empty());
}

#[test]
fn test_request_open_text_is_named_by_hash() {
    let (_tmp, config) = setup_test_env();
    let output = run_skb(&config, &["request", "open", "--text", "let x = 1"]);
    let json = stdout_json(&output);
    assert_eq!(json["key.sourcetext"], "let x = 1");
    assert_eq!(json["key.name"].as_str().unwrap().len(), 64);
}

#[test]
fn test_request_custom_from_json_file() {
    let (tmp, config) = setup_test_env();
    let request = tmp.path().join("request.json");
    fs::write(
        &request,
        r#"{"key.request": {"$uid": "source.request.protocol_version"}}"#,
    )
    .unwrap();
    let output = run_skb(
        &config,
        &["request", "custom", "--json", request.to_str().unwrap()],
    );
    let json = stdout_json(&output);
    assert_eq!(
        json,
        serde_json::json!({"key.request": {"$uid": "source.request.protocol_version"}})
    );
}

#[test]
fn test_replay_prints_decoded_value() {
    let (tmp, config) = setup_test_env();
    let fixture = write_fixture(
        tmp.path(),
        r#"{"responses": [{"result": {
            "key.kind": {"$uid": "source.lang.swift.decl.function.free"},
            "key.name": "foo",
            "key.offset": 5,
            "key.latin": {"$bytes": "gA=="},
            "key.bad": {"$bytes": "gQ=="},
            "key.entities": [1, null, 2]
        }}]}"#,
    );
    let output = run_skb(
        &config,
        &[
            "replay",
            fixture.to_str().unwrap(),
            "cursor-info",
            "--file",
            "/src/main.swift",
            "--offset",
            "5",
        ],
    );
    let json = stdout_json(&output);
    assert_eq!(
        json,
        serde_json::json!({
            "key.kind": "source.lang.swift.decl.function.free",
            "key.name": "foo",
            "key.offset": 5,
            "key.latin": "\u{20ac}",
            "key.entities": [1, 2]
        })
    );
}

#[test]
fn test_replay_error_exits_non_zero() {
    let (tmp, config) = setup_test_env();
    let fixture = write_fixture(
        tmp.path(),
        r#"{"responses": [{"error": {"kind": "failed", "description": "no such file"}}]}"#,
    );
    let output = run_skb(
        &config,
        &[
            "replay",
            fixture.to_str().unwrap(),
            "index",
            "--file",
            "/src/missing.swift",
        ],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("request failed: no such file"), "{}", stderr);
}

#[test]
fn test_replay_interruption_waits_for_configured_ceiling() {
    let (tmp, config) = setup_test_env();
    let fixture = write_fixture(
        tmp.path(),
        r#"{"responses": [{"error": {"kind": "connection_interrupted"}}]}"#,
    );
    let start = Instant::now();
    let output = run_skb(
        &config,
        &[
            "replay",
            fixture.to_str().unwrap(),
            "index",
            "--file",
            "/src/main.swift",
        ],
    );
    assert!(start.elapsed() >= Duration::from_millis(200));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("connection to the analysis service interrupted"),
        "{}",
        stderr
    );
}

#[test]
fn test_replay_best_effort_aborts_on_error() {
    let (tmp, config) = setup_test_env();
    let fixture = write_fixture(
        tmp.path(),
        r#"{"responses": [{"error": {"kind": "invalid", "description": "bad key"}}]}"#,
    );
    let output = run_skb(
        &config,
        &[
            "replay",
            fixture.to_str().unwrap(),
            "--best-effort",
            "index",
            "--file",
            "/src/main.swift",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid request: bad key"));
}

#[test]
fn test_missing_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let output = run_skb(
        &tmp.path().join("absent.toml"),
        &["request", "format", "--file", "/a.swift", "--line", "1"],
    );
    let json = stdout_json(&output);
    assert_eq!(
        json["key.editor.format.options"]["key.editor.format.indentwidth"],
        4
    );
}

#[test]
fn test_invalid_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("skb.toml");
    fs::write(&config, "[engine]\nrestore_wait_secs = -1\n").unwrap();
    let output = run_skb(&config, &["request", "index", "--file", "/a.swift"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("restore_wait_secs"));
}

#[test]
fn test_completions() {
    let output = Command::new(skb_binary())
        .args(["completions", "bash"])
        .output()
        .expect("Failed to run skb");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("skb"));
}
