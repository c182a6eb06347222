//! Test-file persistence
//!
//! Generated modules mirror the source tree: tests for `add` in
//! `src/utils/code.py` land in `<base>/src/utils/code/test_add.py`.

use std::path::{Component, Path, PathBuf};

/// Where the test module for `function_name` goes
///
/// Only the normal components of the source directory are kept, so the
/// result always stays under `base_dir`.
#[must_use]
pub fn test_file_path(source_file: &Path, function_name: &str, base_dir: &Path) -> PathBuf {
    let mut path = base_dir.to_path_buf();
    if let Some(parent) = source_file.parent() {
        for component in parent.components() {
            if let Component::Normal(part) = component {
                path.push(part);
            }
        }
    }
    if let Some(stem) = source_file.file_stem() {
        path.push(stem);
    }
    path.push(format!("test_{function_name}.py"));
    path
}

/// Write a generated module, creating directories as needed
///
/// # Errors
/// Directory creation or write failures.
pub fn save_test_file(
    code: &str,
    source_file: &Path,
    function_name: &str,
    base_dir: &Path,
) -> std::io::Result<PathBuf> {
    let path = test_file_path(source_file, function_name, base_dir);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, code)?;
    tracing::info!("Test file saved to {}", path.display());
    Ok(path)
}
