//! Discovery of article source files.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SOURCE_EXTENSION: &str = "md";

/// Walk `root` depth-first and collect every `.md` file.
///
/// The caller is expected to have checked that `root` is a directory.
/// Entries that cannot be read are logged and skipped.
pub fn scan_sources(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                tracing::warn!(%path, error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            files.push(entry.into_path());
        }
    }

    files
}
