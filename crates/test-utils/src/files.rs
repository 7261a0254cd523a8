//! Temporary files for tests that read from disk.

use std::io::Write;

use tempfile::NamedTempFile;

/// Write `contents` to a fresh temporary `.yaml` file.
///
/// The file is removed when the returned handle is dropped.
pub fn temp_yaml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("tilegrids")
        .suffix(".yaml")
        .tempfile()
        .expect("Failed to create temporary spec file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temporary spec file");
    file
}

/// Creates a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}
