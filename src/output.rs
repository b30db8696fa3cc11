//! Serialization of the article index.
//!
//! The artifact is an ES module whose default export is the record array:
//!
//! ```text
//! // Generated by blog-index. Do not edit.
//! export default [
//!   { "title": "...", "slug": "...", ... }
//! ];
//! ```
//!
//! An output path ending in `.json` gets the bare array instead.

use crate::article::ArticleRecord;
use crate::index::BuildError;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

const MODULE_HEADER: &str = "// Generated by blog-index. Do not edit.\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Module,
    Json,
}

impl ArtifactFormat {
    pub fn for_path(path: &Path) -> ArtifactFormat {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ArtifactFormat::Json,
            _ => ArtifactFormat::Module,
        }
    }
}

pub fn render_index(
    records: &[ArticleRecord],
    format: ArtifactFormat,
) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(records)?;
    Ok(match format {
        ArtifactFormat::Json => format!("{}\n", json),
        ArtifactFormat::Module => format!("{}export default {};\n", MODULE_HEADER, json),
    })
}

/// Write the index to `path` in one step: the content goes to a sibling
/// temp file which is then renamed over the target.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_index(records: &[ArticleRecord], path: &Path) -> Result<(), BuildError> {
    let content = render_index(records, ArtifactFormat::for_path(path))?;
    let write_err = |source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let tmp = temp_path(path);
    std::fs::write(&tmp, content).map_err(write_err)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(e));
    }

    info!(count = records.len(), "Wrote article index");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "index".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
