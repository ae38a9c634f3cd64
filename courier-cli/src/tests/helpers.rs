//! Test helpers for writing plan files into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write test file");
}

pub(super) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Origin at (0, 0) and three stops due north, listed far, near, middle.
pub(super) const UNORDERED_PLAN: &str = r#"{
  "origin": { "lat": 0.0, "lng": 0.0 },
  "stops": [
    { "address": "far", "lat": 0.3, "lng": 0.0 },
    { "address": "near", "lat": 0.1, "lng": 0.0 },
    { "address": "middle", "lat": 0.2, "lng": 0.0 }
  ]
}"#;

pub(super) const PLAN_WITHOUT_ORIGIN: &str = r#"{
  "stops": [
    { "address": "only", "lat": 37.5665, "lng": 126.978 }
  ]
}"#;
