//! End-to-end checks for the JSON file helpers and delay.

use std::fs;
use std::time::Duration;

use jsonenv::{delay_ms, read_json_file, safe_stringify, write_json_file};
use serde_json::{Value, json};
use tempfile::TempDir;

#[test]
fn test_read_nonexistent_path_is_absent() {
    assert!(read_json_file::<Value>("/no/such/file.json").is_none());
}

#[test]
fn test_read_invalid_json_is_absent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{not valid json").unwrap();
    assert!(read_json_file::<Value>(&path).is_none());
}

#[test]
fn test_write_then_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.json");
    write_json_file(&path, &json!({"a": 1})).unwrap();
    assert_eq!(read_json_file::<Value>(&path), Some(json!({"a": 1})));
}

#[test]
fn test_write_big_integers_read_back_as_strings() {
    #[derive(serde::Serialize)]
    struct Ledger {
        total: u128,
        count: u32,
    }
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.json");
    write_json_file(&path, &Ledger { total: 1 << 70, count: 3 }).unwrap();
    assert_eq!(
        read_json_file::<Value>(&path),
        Some(json!({"total": "1180591620717411303424", "count": 3}))
    );
}

#[test]
fn test_stringify_matches_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("b.json");
    let value = json!({"list": [1, 2, 3], "name": "b"});
    write_json_file(&path, &value).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), safe_stringify(&value, 2));
}

#[tokio::test(start_paused = true)]
async fn test_delay_is_not_early() {
    let start = tokio::time::Instant::now();
    delay_ms(50).await;
    assert!(start.elapsed() >= Duration::from_millis(50));
}
