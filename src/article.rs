use serde::Serialize;
use std::cmp::{Ord, Ordering, PartialOrd};

/// One entry of the generated article index.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    pub title: String,
    pub slug: String,
    pub file_path: String,
    pub cover: String,
    pub date: String,
    pub word_count: usize,
    pub preview: String,
    pub tags: Vec<String>,
}

// Display order: newest first, then by source path so equal dates stay stable.
impl PartialOrd for ArticleRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArticleRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.date == other.date {
            self.file_path.cmp(&other.file_path)
        } else {
            other.date.cmp(&self.date)
        }
    }
}
