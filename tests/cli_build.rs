use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn blog_index() -> Command {
    let mut cmd = Command::cargo_bin("blog-index").unwrap();
    cmd.env_remove("BLOG_ARTICLES_ROOT")
        .env_remove("BLOG_INDEX_OUTPUT")
        .env_remove("BLOG_WORD_COUNT")
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1");
    cmd
}

fn read_module(path: &Path) -> Value {
    let text = fs::read_to_string(path).unwrap();
    let start = text.find("export default ").unwrap() + "export default ".len();
    let array = text[start..].trim_end().trim_end_matches(';');
    serde_json::from_str(array).unwrap()
}

fn write_articles(root: &Path) {
    fs::create_dir_all(root.join("poems")).unwrap();
    fs::write(
        root.join("opening.md"),
        "---\ntitle: 开篇\ndate: 2025-11-25\ncover: /img/open.png\ntags:\n  - 道\n---\n道生一，一生二。\n",
    )
    .unwrap();
    fs::write(
        root.join("poems/moon.md"),
        "<meta title=\"诗\" date=\"2025-12-05\" tags=\"随笔，古诗\" />\n床前明月光",
    )
    .unwrap();
    fs::write(
        root.join("poems/river.md"),
        "<meta title=\"江\" date=\"2025-12-05\" desc=\"大江东去\" />\n浪淘尽",
    )
    .unwrap();
    fs::write(root.join("untitled.md"), "---\ndate: 2026-01-01\n---\nno title").unwrap();
}

#[test]
fn builds_module_index() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("articles");
    write_articles(&root);
    let output = dir.path().join("src/data/articles.js");

    blog_index()
        .arg("--articles-root")
        .arg(&root)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("untitled.md"))
        .stdout(predicate::str::contains("missing required field `title`"));

    let index = read_module(&output);
    let records = index.as_array().unwrap();
    assert_eq!(records.len(), 3);

    let slugs: Vec<&str> = records.iter().map(|r| r["slug"].as_str().unwrap()).collect();
    assert_eq!(slugs, vec!["poems/moon", "poems/river", "opening"]);

    assert_eq!(records[0]["tags"], serde_json::json!(["随笔", "古诗"]));
    assert_eq!(records[0]["filePath"], "poems/moon.md");
    assert_eq!(records[1]["preview"], "大江东去");
    assert_eq!(records[2]["title"], "开篇");
    assert_eq!(records[2]["date"], "2025-11-25");
    assert_eq!(records[2]["cover"], "/img/open.png");
    assert_eq!(records[2]["wordCount"], 8);
    assert!(records[2]["preview"].as_str().unwrap().starts_with("道生一"));
    Ok(())
}

#[test]
fn output_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("articles");
    write_articles(&root);
    let output = dir.path().join("index.json");

    blog_index().arg("-a").arg(&root).arg("-o").arg(&output).assert().success();
    let first = fs::read(&output)?;
    blog_index().arg("-a").arg(&root).arg("-o").arg(&output).assert().success();
    let second = fs::read(&output)?;
    assert_eq!(first, second);

    let parsed: Value = serde_json::from_slice(&first)?;
    assert_eq!(parsed.as_array().unwrap().len(), 3);
    Ok(())
}

#[test]
fn token_policy_counts_words() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("articles");
    fs::create_dir_all(&root)?;
    fs::write(root.join("en.md"), "---\ntitle: English\n---\nthree little words\n")?;
    let output = dir.path().join("index.json");

    blog_index()
        .arg("-a")
        .arg(&root)
        .arg("-o")
        .arg(&output)
        .arg("--word-count")
        .arg("tokens")
        .assert()
        .success();

    let parsed: Value = serde_json::from_str(&fs::read_to_string(&output)?)?;
    assert_eq!(parsed[0]["wordCount"], 3);
    Ok(())
}

#[test]
fn empty_root_writes_empty_index() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("articles");
    fs::create_dir_all(&root)?;
    let output = dir.path().join("articles.js");

    blog_index().arg("-a").arg(&root).arg("-o").arg(&output).assert().success();

    assert_eq!(read_module(&output), serde_json::json!([]));
    Ok(())
}

#[test]
fn missing_root_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("articles.js");

    blog_index()
        .arg("-a")
        .arg(dir.path().join("missing"))
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("articles root does not exist"));

    assert!(!output.exists());
    Ok(())
}

#[test]
fn reads_paths_from_environment() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("articles");
    write_articles(&root);
    let output = dir.path().join("from-env.json");

    blog_index()
        .env("BLOG_ARTICLES_ROOT", &root)
        .env("BLOG_INDEX_OUTPUT", &output)
        .assert()
        .success();

    assert!(output.exists());
    Ok(())
}
