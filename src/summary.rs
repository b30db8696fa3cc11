use comrak::ComrakOptions;
use regex::Regex;

pub const PREVIEW_MAX_CHARS: usize = 50;
pub const PREVIEW_MAX_LINES: usize = 5;
pub const ELLIPSIS: &str = "...";

/// How `wordCount` is measured. One policy applies to a whole build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum WordCountPolicy {
    /// Characters of the rendered text with tags stripped and whitespace
    /// collapsed. Works for scripts that do not separate words by spaces.
    /// A body that renders to no text at all (an image, a comment) falls
    /// back to its token count, so only blank bodies count as zero.
    #[default]
    Characters,
    /// Whitespace separated tokens of the raw body.
    Tokens,
}

#[derive(Debug)]
pub struct MarkdownRenderer {
    option: ComrakOptions,
}

impl MarkdownRenderer {
    pub fn new() -> MarkdownRenderer {
        let mut option = ComrakOptions::default();
        option.extension.strikethrough = true;
        option.extension.footnotes = true;
        option.extension.autolink = true;
        option.extension.table = true;
        option.extension.description_lists = true;
        option.render.unsafe_ = true;

        MarkdownRenderer { option }
    }

    pub fn to_html(&self, markdown: &str) -> String {
        comrak::markdown_to_html(markdown, &self.option)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub word_count: usize,
    pub preview: String,
}

#[derive(Debug)]
pub struct Summarizer<'a> {
    renderer: &'a MarkdownRenderer,
    policy: WordCountPolicy,
    html_tag_regex: Regex,
    footnote_html_regex: Regex,
    whitespace_regex: Regex,
    rule_regex: Regex,
    image_regex: Regex,
    link_regex: Regex,
    footnote_ref_regex: Regex,
    footnote_def_regex: Regex,
    table_pipe_regex: Regex,
    block_marker_regex: Regex,
    emphasis_regex: Regex,
}

impl<'a> Summarizer<'a> {
    pub fn new(
        renderer: &'a MarkdownRenderer,
        policy: WordCountPolicy,
    ) -> Result<Summarizer<'a>, regex::Error> {
        Ok(Summarizer {
            renderer,
            policy,
            html_tag_regex: Regex::new(r"<[^>]+>")?,
            footnote_html_regex: Regex::new(
                r"(?s)<sup[^>]*footnote-ref[^>]*>.*?</sup>|<a [^>]*footnote-backref[^>]*>.*?</a>",
            )?,
            whitespace_regex: Regex::new(r"\s+")?,
            rule_regex: Regex::new(r"^(?:[|:\-\s]+|=+|(?:\*\s*){3,}|(?:_\s*){3,})$")?,
            image_regex: Regex::new(r"!\[([^\]]*)\]\([^)]*\)")?,
            link_regex: Regex::new(r"\[([^\]]*)\]\([^)]*\)")?,
            footnote_ref_regex: Regex::new(r"\[\^[^\]]*\]")?,
            footnote_def_regex: Regex::new(r"^\[\^[^\]]+\]:")?,
            table_pipe_regex: Regex::new(r"\s*\|\s*")?,
            block_marker_regex: Regex::new(r"^(?:#{1,6}\s+|>\s*|[-*+]\s+|\d+[.)]\s+)+")?,
            emphasis_regex: Regex::new(r"\*+|_{2,}|~~|`+")?,
        })
    }

    pub fn summarize(&self, body: &str) -> Summary {
        if body.trim().is_empty() {
            return Summary {
                word_count: 0,
                preview: String::new(),
            };
        }

        Summary {
            word_count: self.word_count(body),
            preview: self.preview(body),
        }
    }

    pub fn word_count(&self, body: &str) -> usize {
        match self.policy {
            WordCountPolicy::Tokens => body.split_whitespace().count(),
            WordCountPolicy::Characters => {
                let html = self.renderer.to_html(body);
                let html = self.footnote_html_regex.replace_all(&html, "");
                let text = self.html_tag_regex.replace_all(&html, "");
                let text = decode_entities(&text);
                match self.whitespace_regex.replace_all(&text, " ").trim().chars().count() {
                    0 => body.split_whitespace().count(),
                    n => n,
                }
            }
        }
    }

    /// First few prose lines of `body` as plain text, bounded by
    /// [`PREVIEW_MAX_CHARS`].
    pub fn preview(&self, body: &str) -> String {
        let mut lines = Vec::new();
        let mut fence: Option<(char, usize)> = None;

        for line in body.lines() {
            let trimmed = line.trim();
            if let Some((marker, len)) = fence_run(trimmed) {
                match fence {
                    None => {
                        fence = Some((marker, len));
                        continue;
                    }
                    // A closing fence repeats the opening marker, at least as long, with no info string.
                    Some((open, open_len))
                        if marker == open && len >= open_len && trimmed.len() == len =>
                    {
                        fence = None;
                        continue;
                    }
                    Some(_) => {}
                }
            }
            if fence.is_some()
                || trimmed.is_empty()
                || self.rule_regex.is_match(trimmed)
                || self.footnote_def_regex.is_match(trimmed)
            {
                continue;
            }
            let text = self.strip_markup(trimmed);
            if text.is_empty() {
                continue;
            }
            lines.push(text);
            if lines.len() == PREVIEW_MAX_LINES {
                break;
            }
        }

        truncate_preview(&lines.join(" "))
    }

    fn strip_markup(&self, line: &str) -> String {
        let text = self.image_regex.replace_all(line, "$1");
        let text = self.footnote_ref_regex.replace_all(&text, "");
        let text = self.link_regex.replace_all(&text, "$1");
        let text = self.html_tag_regex.replace_all(&text, "");
        let text = self.block_marker_regex.replace(&text, "");
        let text = self.table_pipe_regex.replace_all(&text, " ");
        let text = self.strip_emphasis(&text);
        let text = decode_entities(&text);
        self.whitespace_regex
            .replace_all(&text, " ")
            .trim()
            .to_string()
    }

    // Emphasis and code markers attached to text are dropped; a marker with
    // whitespace on both sides is prose (`2 * 3`) and stays.
    fn strip_emphasis(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in self.emphasis_regex.find_iter(text) {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            out.push_str(&text[last..m.start()]);
            if before.is_some_and(char::is_whitespace) && after.is_some_and(char::is_whitespace) {
                out.push_str(m.as_str());
            }
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }
}

/// Marker character and length of a code fence line (three or more
/// backticks or tildes).
fn fence_run(line: &str) -> Option<(char, usize)> {
    let marker = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = line.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some((marker, len))
}

/// Cut `text` to [`PREVIEW_MAX_CHARS`] characters. The ellipsis is only
/// added when something was actually cut.
pub fn truncate_preview(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(PREVIEW_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", text[..cut].trim_end(), ELLIPSIS),
        None => text.to_string(),
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
