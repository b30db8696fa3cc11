use crate::article::ArticleRecord;
use crate::metadata::{self, ExtractError};
use crate::scan::{scan_sources, SOURCE_EXTENSION};
use crate::summary::{truncate_preview, Summarizer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Problems that cost a single article its place in the index.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("cannot read file: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("missing required field `title`")]
    MissingTitle,

    #[error("duplicate slug `{0}`")]
    DuplicateSlug(String),
}

/// Problems that stop the build.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("articles root does not exist or is not a directory: {0}")]
    MissingRoot(PathBuf),

    #[error("failed to serialize index: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct BuildReport {
    /// Records in display order.
    pub records: Vec<ArticleRecord>,
    pub scanned: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct IndexBuilder<'a> {
    root: PathBuf,
    summarizer: &'a Summarizer<'a>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(root: PathBuf, summarizer: &'a Summarizer<'a>) -> IndexBuilder<'a> {
        IndexBuilder { root, summarizer }
    }

    #[instrument(level = "info", skip_all, fields(root = %self.root.display()))]
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        if !self.root.is_dir() {
            return Err(BuildError::MissingRoot(self.root.clone()));
        }

        let mut files = scan_sources(&self.root);
        files.sort();
        info!(count = files.len(), "Found article sources");

        let mut records = vec![];
        let mut slugs = HashSet::new();
        let mut skipped = 0;

        for file in files.iter() {
            let result = self.process_file(file).and_then(|record| {
                if slugs.insert(record.slug.clone()) {
                    Ok(record)
                } else {
                    Err(FileError::DuplicateSlug(record.slug))
                }
            });
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "Skipping article");
                    skipped += 1;
                }
            }
        }

        records.sort();

        Ok(BuildReport {
            records,
            scanned: files.len(),
            skipped,
        })
    }

    fn process_file(&self, file: &Path) -> Result<ArticleRecord, FileError> {
        let relative_path = file.strip_prefix(&self.root).unwrap_or(file);
        let file_path = relative_key(relative_path);
        let slug = file_path
            .strip_suffix(&format!(".{}", SOURCE_EXTENSION))
            .unwrap_or(&file_path)
            .to_string();

        debug!(path = %file.display(), %slug, "Processing");

        let raw = std::fs::read_to_string(file)?;
        let (strategy, meta, body) = metadata::extract(&raw)?;
        if strategy.is_none() {
            warn!(path = %file.display(), "No metadata block or tag found");
        }
        if meta.title.trim().is_empty() {
            return Err(FileError::MissingTitle);
        }

        let summary = self.summarizer.summarize(&body);
        let preview = match meta.desc {
            Some(desc) => truncate_preview(&desc),
            None => summary.preview,
        };

        let date = if meta.date.is_empty() {
            meta.date
        } else {
            metadata::normalize_date(&meta.date).unwrap_or_else(|| {
                warn!(path = %file.display(), date = %meta.date, "Unrecognised date, keeping it as written");
                meta.date.clone()
            })
        };

        Ok(ArticleRecord {
            title: meta.title,
            slug,
            file_path,
            cover: meta.cover,
            date,
            word_count: summary.word_count,
            preview,
            tags: meta.tags,
        })
    }
}

/// Relative path with `/` separators regardless of platform.
fn relative_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
