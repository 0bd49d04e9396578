//! File discovery for the CLI: expands directories recursively, filtering
//! by the implementation file extension, and normalizes separators to
//! forward slashes. Explicitly named files are always included.

use std::path::{Path, PathBuf};

const IMPL_EXTENSION: &str = "py";

/// Expand `paths` into an ordered list of forward-slash file paths.
///
/// Directories are walked recursively (entries sorted per directory, so the
/// output is deterministic) keeping only `*.py` files; nonexistent paths are
/// skipped with a warning.
pub fn collect_files(paths: &[PathBuf]) -> Vec<String> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(normalize(path));
        } else if path.is_dir() {
            walk(path, &mut files);
        } else {
            tracing::warn!(path = %path.display(), "skipping nonexistent path");
        }
    }
    files
}

fn walk(dir: &Path, out: &mut Vec<String>) {
    let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "skipping unreadable directory");
            return;
        }
    };
    entries.sort();
    for entry in entries {
        if entry.is_dir() {
            walk(&entry, out);
        } else if entry.extension().is_some_and(|ext| ext == IMPL_EXTENSION) {
            out.push(normalize(&entry));
        }
    }
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
