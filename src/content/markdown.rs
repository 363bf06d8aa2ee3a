//! Markdown rendering
//!
//! Posts are hand-authored by the operator, so the dialect is tuned for
//! them: footnotes, auto-generated heading anchor ids, and block elements
//! that need not be preceded by a blank line. The output is a trusted HTML
//! fragment embedded verbatim into the page template; submitter-provided
//! text must never go through this renderer.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use super::post::Post;
use crate::errors::SiteError;

/// Markdown renderer for post source files
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_HEADING_ATTRIBUTES;
        Self { options }
    }

    /// Render a post's source file from the posts directory
    ///
    /// The file is read and parsed on every call; there is no cache.
    pub fn render_post(&self, posts_dir: &Path, post: &Post) -> Result<String, SiteError> {
        let path = posts_dir.join(&post.filename);
        let source = fs::read_to_string(&path).map_err(|e| SiteError::SourceNotFound {
            path: path.clone(),
            source: e,
        })?;
        Ok(self.render(&source))
    }

    /// Render markdown text to an HTML fragment
    pub fn render(&self, markdown: &str) -> String {
        let loosened = loosen_blocks(markdown);
        let parser = Parser::new_ext(&loosened, self.options);

        let mut events: Vec<Event> = parser.collect();
        inject_heading_ids(&mut events);
        let events = open_links_in_new_context(events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Give every heading without an explicit id a slugified anchor id
///
/// Repeated heading text gets a numeric suffix ("intro", "intro-1", ...)
/// so anchors stay unique within one document.
fn inject_heading_ids(events: &mut [Event]) {
    let mut seen: HashMap<String, usize> = HashMap::new();

    for i in 0..events.len() {
        let needs_id = matches!(
            events[i],
            Event::Start(Tag::Heading { id: None, .. })
        );
        if !needs_id {
            continue;
        }

        let mut text = String::new();
        for event in events[i + 1..].iter() {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                Event::End(TagEnd::Heading(_)) => break,
                _ => {}
            }
        }

        let base = slug::slugify(&text);
        if base.is_empty() {
            continue;
        }

        let count = seen.entry(base.clone()).or_insert(0);
        let anchor = if *count == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(anchor));
        }
    }
}

/// Rewrite link events into raw anchors opening a new browsing context
fn open_links_in_new_context(events: Vec<Event>) -> Vec<Event> {
    events
        .into_iter()
        .map(|event| match event {
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) => {
                let mut anchor = format!(r#"<a href="{}""#, html_escape(&dest_url));
                if !title.is_empty() {
                    anchor.push_str(&format!(r#" title="{}""#, html_escape(&title)));
                }
                anchor.push_str(r#" target="_blank" rel="noopener">"#);
                Event::InlineHtml(CowStr::from(anchor))
            }
            Event::End(TagEnd::Link) => Event::InlineHtml(CowStr::from("</a>")),
            other => other,
        })
        .collect()
}

/// What a trimmed source line opens, for `loosen_blocks`
#[derive(Clone, Copy, PartialEq)]
enum LineKind {
    Blank,
    Heading,
    Fence,
    Quote,
    ListItem,
    Other,
}

fn classify(line: &str) -> LineKind {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('#') {
        return LineKind::Heading;
    }
    if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
        return LineKind::Fence;
    }
    if trimmed.starts_with('>') {
        return LineKind::Quote;
    }
    if is_list_marker(trimmed) {
        return LineKind::ListItem;
    }
    LineKind::Other
}

fn is_list_marker(trimmed: &str) -> bool {
    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("+ "))
    {
        return !rest.trim().is_empty();
    }
    // ordered item: digits followed by "." or ")" and a space
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || digits > 9 {
        return false;
    }
    let rest = &trimmed[digits..];
    rest.starts_with(". ") || rest.starts_with(") ")
}

/// Insert the blank lines strict CommonMark wants before block openings
///
/// Headings, fenced code, block quotes and list openings directly after a
/// paragraph line get a blank line inserted, so constructs like an ordered
/// list right under its introduction parse as blocks. Lines inside fenced
/// code are copied verbatim; sibling list items and consecutive quote
/// lines are left alone.
fn loosen_blocks(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 64);
    let mut prev = LineKind::Blank;
    let mut in_fence = false;

    for line in source.lines() {
        let kind = classify(line);

        if in_fence {
            out.push_str(line);
            out.push('\n');
            if kind == LineKind::Fence {
                in_fence = false;
                prev = LineKind::Other;
            }
            continue;
        }

        let opens_block = matches!(
            kind,
            LineKind::Heading | LineKind::Fence | LineKind::Quote | LineKind::ListItem
        );
        // same-kind runs (quote lines, sibling list items) stay together
        if opens_block && prev == LineKind::Other {
            out.push('\n');
        }

        out.push_str(line);
        out.push('\n');

        if kind == LineKind::Fence {
            in_fence = true;
        }
        prev = kind;
    }

    out
}

/// Simple HTML escaping for attribute values
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
