use crate::summary::WordCountPolicy;
use clap::Parser;
use std::path::PathBuf;

/// Scan the articles directory and regenerate the article index.
///
/// Every option has a default, so a bare `blog-index` run from the site
/// root rebuilds `src/data/articles.js` from `public/articles`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding the article sources
    #[arg(
        short,
        long,
        env = "BLOG_ARTICLES_ROOT",
        default_value = "public/articles"
    )]
    pub articles_root: PathBuf,

    /// Index file to generate; `.json` writes a bare array, anything else an ES module
    #[arg(
        short,
        long,
        env = "BLOG_INDEX_OUTPUT",
        default_value = "src/data/articles.js"
    )]
    pub output: PathBuf,

    /// How `wordCount` is measured
    #[arg(
        long,
        env = "BLOG_WORD_COUNT",
        value_enum,
        default_value_t = WordCountPolicy::Characters
    )]
    pub word_count: WordCountPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["blog-index"]);
        assert_eq!(cli.articles_root, PathBuf::from("public/articles"));
        assert_eq!(cli.output, PathBuf::from("src/data/articles.js"));
        assert_eq!(cli.word_count, WordCountPolicy::Characters);
    }

    #[test]
    fn short_flags() {
        let cli = Cli::parse_from([
            "blog-index",
            "-a",
            "/tmp/articles",
            "-o",
            "/tmp/index.json",
            "--word-count",
            "tokens",
        ]);
        assert_eq!(cli.articles_root, PathBuf::from("/tmp/articles"));
        assert_eq!(cli.output, PathBuf::from("/tmp/index.json"));
        assert_eq!(cli.word_count, WordCountPolicy::Tokens);
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["blog-index", "--word-count", "bytes"]).is_err());
    }
}
