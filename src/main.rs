use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod article;
mod cli;
mod index;
mod metadata;
mod output;
mod scan;
mod summary;

use cli::Cli;
use index::IndexBuilder;
use summary::{MarkdownRenderer, Summarizer};

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args = Cli::parse();
    info!(
        root = %args.articles_root.display(),
        output = %args.output.display(),
        word_count = ?args.word_count,
        "Building article index"
    );

    let renderer = MarkdownRenderer::new();
    let summarizer = Summarizer::new(&renderer, args.word_count)?;
    let builder = IndexBuilder::new(args.articles_root.clone(), &summarizer);

    let report = builder.build()?;
    output::write_index(&report.records, &args.output)
        .with_context(|| format!("cannot write article index {}", args.output.display()))?;

    info!(
        scanned = report.scanned,
        written = report.records.len(),
        skipped = report.skipped,
        "Done"
    );

    Ok(())
}
