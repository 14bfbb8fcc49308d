//! CLI executor tests against files on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;
use tugscope::cli::{run_lookup, run_rename, run_stream, Settings};
use tugscope::config::{UnboundPolicy, CONFIG_DIR, CONFIG_FILE};
use tugscope::error::RefactorError;
use tugscope::output::ErrorResponse;

const SOURCE: &str = r#"package main

func main() {
	count := 0
	for i := 0; i < 3; i++ {
		count += i
		{
			count := "shadow"
			println(count)
		}
	}
	println(count)
}
"#;

fn fixture() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("main.go");
    fs::write(&path, SOURCE).unwrap();
    (dir, path)
}

fn at(path: &Path, line: u32, col: u32) -> String {
    format!("{}:{}:{}", path.display(), line, col)
}

fn json(out: Vec<u8>) -> Value {
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn lookup_reports_groups_innermost_first() {
    let (_dir, path) = fixture();
    let mut out = Vec::new();
    run_lookup(&Settings::default(), &at(&path, 6, 3), &mut out).unwrap();
    let response = json(out);

    assert_eq!(response["status"], "ok");
    assert_eq!(response["symbol"]["name"], "count");
    assert_eq!(response["symbol"]["resolution"], "bound");
    assert_eq!(response["symbol"]["scope_kind"], "function");
    assert_eq!(response["symbol"]["declaration"]["line"], 4);

    let kinds: Vec<_> = response["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["scope_kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["block", "for", "function"]);
}

#[test]
fn rename_preview_leaves_the_file_alone() {
    let (_dir, path) = fixture();
    let mut out = Vec::new();
    run_rename(&Settings::default(), &at(&path, 4, 2), "total", false, &mut out).unwrap();
    let response = json(out);

    assert_eq!(response["summary"]["edits_count"], 3);
    assert!(response.get("applied").is_none());
    let preview = response["preview"].as_str().unwrap();
    assert!(preview.contains("\ttotal := 0\n"));
    assert!(preview.contains("\t\ttotal += i\n"));
    assert!(preview.contains("count := \"shadow\""));
    assert!(preview.contains("println(count)"));
    assert!(preview.contains("\tprintln(total)\n"));
    assert_eq!(fs::read_to_string(&path).unwrap(), SOURCE);
}

#[test]
fn rename_apply_writes_the_file() {
    let (_dir, path) = fixture();
    let mut out = Vec::new();
    run_rename(&Settings::default(), &at(&path, 8, 4), "label", true, &mut out).unwrap();
    let response = json(out);

    assert_eq!(response["applied"], true);
    assert!(response.get("preview").is_none());
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("label := \"shadow\""));
    assert!(written.contains("println(label)"));
    assert!(written.contains("\tprintln(count)\n"));
    assert_eq!(response["after_hash"], tugscope::patch::content_hash(&written));
}

#[test]
fn missing_file_is_file_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.go");
    let err = run_lookup(&Settings::default(), &at(&path, 1, 1), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, RefactorError::FileNotFound { .. }));
}

#[test]
fn errors_render_as_json_with_codes() {
    let (_dir, path) = fixture();
    let err = run_lookup(&Settings::default(), &at(&path, 2, 1), &mut Vec::new()).unwrap_err();
    let response = ErrorResponse::from_error(&err);
    assert_eq!(response.status, "error");
    assert_eq!(response.error.code, 3);

    let err = run_rename(&Settings::default(), &at(&path, 4, 2), "1x", false, &mut Vec::new())
        .unwrap_err();
    assert_eq!(ErrorResponse::from_error(&err).error.code, 2);
}

#[test]
fn config_file_sets_the_policy() {
    let (dir, path) = fixture();
    fs::create_dir(dir.path().join(CONFIG_DIR)).unwrap();
    fs::write(
        dir.path().join(CONFIG_DIR).join(CONFIG_FILE),
        "[resolve]\nunbound = \"reject\"\n[output]\npretty = false\n",
    )
    .unwrap();

    let settings = Settings::load(None, dir.path()).unwrap();
    assert_eq!(settings.policy(), UnboundPolicy::Reject);

    let err = run_lookup(&settings, &at(&path, 12, 2), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, RefactorError::UnboundDeclaringScope { .. }));

    let mut out = Vec::new();
    run_lookup(&settings, &at(&path, 12, 10), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}

#[tokio::test]
async fn stream_writes_one_line_per_group() {
    let (_dir, path) = fixture();
    let mut out = Vec::new();
    tokio::time::timeout(
        Duration::from_secs(5),
        run_stream(&Settings::default(), &at(&path, 9, 12), &mut out),
    )
    .await
    .expect("stream should finish")
    .unwrap();

    let lines: Vec<Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["status"], "group");
    assert_eq!(lines[0]["name"], "count");
    assert_eq!(lines[0]["depth"], 4);
    assert_eq!(lines[0]["scope_kind"], "block");
    assert_eq!(lines[0]["positions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn stream_on_whitespace_is_not_found() {
    let (_dir, path) = fixture();
    let err = run_stream(&Settings::default(), &at(&path, 2, 1), &mut Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RefactorError::SymbolNotFound { .. }));
}

#[tokio::test]
async fn stream_past_the_last_line_is_invalid_arguments() {
    let (_dir, path) = fixture();
    let err = run_stream(&Settings::default(), &at(&path, 40, 1), &mut Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RefactorError::InvalidArguments { .. }));
    assert_eq!(err.error_code().code(), 2);
}
