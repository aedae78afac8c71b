use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

const SCHEMA: &str = r#"
title: kli
commands:
  - name: hello
    description: Greetings
    actions:
      - name: say
        description: Say hello
        options:
          - { name: name, flag: n, default: John Doe }
          - { name: age, type: { kind: number, integer: true }, default: 18 }
      - name: wave
        options:
          - { name: times, type: { kind: number, min: 1 }, offsets: { at: 0 } }
"#;

fn write_schema(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("failed to write schema");
    path
}

fn cmdkit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cmdkit"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run cmdkit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_prints_parsed_arguments_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "kli.yaml", SCHEMA);

    let out = cmdkit(&[
        "run",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "hello",
        "say",
        "--name=Harry",
        "--age=25",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["action"], "say");
    assert_eq!(json["named"]["name"], "Harry");
    assert_eq!(json["named"]["age"], 25.0);
}

#[test]
fn run_applies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "kli.yml", SCHEMA);

    let out = cmdkit(&["run", "--schema", schema.to_str().unwrap(), "--", "hello", "say"]);
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["named"]["name"], "John Doe");
    assert_eq!(json["named"]["age"], 18.0);
}

#[test]
fn run_keeps_anonymous_arguments_after_double_dash() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "kli.yaml", SCHEMA);

    let out = cmdkit(&[
        "run",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "hello",
        "wave",
        "3",
        "--",
        "-x",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["named"]["times"], 3.0);
    assert_eq!(json["anonymous"], serde_json::json!(["-x"]));
}

#[test]
fn run_supports_yaml_and_table_output() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "kli.yaml", SCHEMA);
    let schema = schema.to_str().unwrap();

    let out = cmdkit(&["run", "--schema", schema, "--format", "yaml", "--", "hello", "say"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("name: John Doe"));

    let out = cmdkit(&[
        "run", "--schema", schema, "--format", "table", "--", "hello", "say", "-n=Ann",
    ]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Ann"));
}

#[test]
fn run_input_errors_exit_with_code_2() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "kli.yaml", SCHEMA);
    let schema = schema.to_str().unwrap();

    let out = cmdkit(&["run", "--schema", schema, "--", "hey"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("unknown command: hey"));

    let out = cmdkit(&["run", "--schema", schema, "--", "hello", "say", "--age=2.5"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("is not a valid integer"));

    let out = cmdkit(&["run", "--schema", schema, "--", "hello", "say", "-x"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn run_shows_scoped_help() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "kli.yaml", SCHEMA);
    let schema = schema.to_str().unwrap();

    let out = cmdkit(&["run", "--schema", schema, "--", "hello", "--help"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Actions:"));
    assert!(text.contains("wave"));

    let out = cmdkit(&["run", "--schema", schema, "--", "hello"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("say"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_reports_schema_size() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "kli.yaml", SCHEMA);

    let out = cmdkit(&["check", "--schema", schema.to_str().unwrap()]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out).trim(),
        "1 command(s), 2 action(s), 3 option(s)"
    );
}

#[test]
fn check_rejects_conflicting_schema() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(
        dir.path(),
        "bad.json",
        r#"{
            "title": "kli",
            "commands": [{
                "name": "hello",
                "actions": [{
                    "name": "say",
                    "options": [
                        { "name": "name", "flag": "n" },
                        { "name": "number", "flag": "n" }
                    ]
                }]
            }]
        }"#,
    );

    let out = cmdkit(&["check", "--schema", schema.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("already defined"));
}

#[test]
fn check_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "kli.toml", "title = 'kli'");

    let out = cmdkit(&["check", "--schema", schema.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("unsupported schema file format"));
}

// ---------------------------------------------------------------------------
// shell
// ---------------------------------------------------------------------------

#[test]
fn shell_executes_piped_lines() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "kli.yaml", SCHEMA);

    let mut child = Command::new(env!("CARGO_BIN_EXE_cmdkit"))
        .args([
            "-q",
            "shell",
            "--schema",
            schema.to_str().unwrap(),
            "--format",
            "json",
        ])
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn cmdkit");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"hello say --name=\"Harry Potter\"\nnope\nquit\nhello say\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("\"Harry Potter\""));
    assert_eq!(text.matches("\"action\"").count(), 1);
    assert!(stderr(&out).contains("unknown command: nope"));
}
