//! Markdown rendering with syntax highlighting and highlighted code lines

use std::collections::BTreeSet;

use anyhow::Result;
use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::helpers::html_escape;

/// CSS class wrapping an emphasized line inside a code block
pub const HIGHLIGHT_LINE_CLASS: &str = "highlight-code-line";

lazy_static! {
    /// Fence info string: language, then an optional `{1,3-5}` line range
    static ref INFO_STRING: Regex = Regex::new(r"^([^\s{]*)\s*(?:\{([\d,\s-]*)\})?").unwrap();
    /// Trailing marker comment (`// highlight-line`, `# highlight-start`, ...)
    static ref MARKER: Regex = Regex::new(
        r"^(.*?)\s*(?://|#|<!--|/\*)\s*highlight-(line|next-line|start|end)\s*(?:-->|\*/)?\s*$"
    )
    .unwrap();
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    /// Create with a specific syntect theme
    pub fn with_theme(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_block = Some(match kind {
                        CodeBlockKind::Fenced(info) => info.to_string(),
                        CodeBlockKind::Indented => String::new(),
                    });
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let info = code_block.take().unwrap_or_default();
                    let highlighted = self.highlight_code(&code_block_content, &info);
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if code_block.is_some() => {
                    code_block_content.push_str(&text);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block, wrapping emphasized lines
    fn highlight_code(&self, code: &str, info: &str) -> String {
        let (lang, ranges) = parse_info_string(info, LinesWithEndings::from(code).count());
        let (code, highlighted_lines) = extract_markers(code, &ranges);
        let lang = lang.unwrap_or_else(|| "text".to_string());
        let lang_class = html_escape(&lang);

        let syntax = self
            .syntax_set
            .find_syntax_by_token(&lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(&lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let mut body = String::new();
        let mut highlighter = theme.map(|theme| HighlightLines::new(syntax, theme));

        for (i, line) in LinesWithEndings::from(&code).enumerate() {
            let rendered = highlighter
                .as_mut()
                .and_then(|h| h.highlight_line(line, &self.syntax_set).ok())
                .and_then(|regions| {
                    styled_line_to_highlighted_html(&regions[..], IncludeBackground::No).ok()
                })
                .unwrap_or_else(|| html_escape(line));

            if highlighted_lines.contains(&(i + 1)) {
                let (content, newline) = match rendered.strip_suffix('\n') {
                    Some(content) => (content.to_string(), "\n"),
                    None => (rendered, ""),
                };
                body.push_str(&format!(
                    r#"<span class="{}">{}</span>{}"#,
                    HIGHLIGHT_LINE_CLASS, content, newline
                ));
            } else {
                body.push_str(&rendered);
            }
        }

        format!(
            r#"<div class="highlight"><pre class="language-{}"><code class="language-{}">{}</code></pre></div>"#,
            lang_class, lang_class, body
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a fence info string into language and 1-based highlighted lines
///
/// Line numbers past `line_count` are dropped; reversed ranges are ignored.
fn parse_info_string(info: &str, line_count: usize) -> (Option<String>, BTreeSet<usize>) {
    let mut lines = BTreeSet::new();
    let Some(caps) = INFO_STRING.captures(info.trim()) else {
        return (None, lines);
    };

    let lang = caps
        .get(1)
        .map(|m| m.as_str().to_string())
        .filter(|l| !l.is_empty());

    if let Some(ranges) = caps.get(2) {
        for part in ranges.as_str().split(',') {
            let part = part.trim();
            match part.split_once('-') {
                Some((start, end)) => {
                    if let (Ok(start), Ok(end)) =
                        (start.trim().parse::<usize>(), end.trim().parse::<usize>())
                    {
                        if start <= end {
                            lines.extend(start..=end.min(line_count));
                        }
                    }
                }
                None => {
                    if let Ok(n) = part.parse::<usize>() {
                        if n <= line_count {
                            lines.insert(n);
                        }
                    }
                }
            }
        }
    }

    (lang, lines)
}

/// Remove marker comments from code, returning the cleaned code and the
/// 1-based line numbers to highlight in it
///
/// `ranges` refers to lines of the cleaned code.
fn extract_markers(code: &str, ranges: &BTreeSet<usize>) -> (String, BTreeSet<usize>) {
    let mut output = String::with_capacity(code.len());
    let mut highlighted = ranges.clone();
    let mut line_no = 0;
    let mut highlight_next = false;
    let mut in_block = false;

    for line in LinesWithEndings::from(code) {
        let Some(caps) = MARKER.captures(line.trim_end_matches(['\n', '\r'])) else {
            line_no += 1;
            output.push_str(line);
            if highlight_next || in_block {
                highlighted.insert(line_no);
                highlight_next = false;
            }
            continue;
        };

        match &caps[2] {
            "line" => {
                line_no += 1;
                output.push_str(&caps[1]);
                if line.ends_with('\n') {
                    output.push('\n');
                }
                highlighted.insert(line_no);
            }
            "next-line" => highlight_next = true,
            "start" => in_block = true,
            _ => in_block = false,
        }
    }

    (output, highlighted)
}
