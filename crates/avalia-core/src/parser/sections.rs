//! Section extraction passes.
//!
//! Each pass is a pure function from response text to the sections its
//! heading grammar recognizes. A section body runs from the line after its
//! heading to the first boundary the grammar honours, or end of text.

use regex::Regex;

use crate::types::PassKind;

use super::patterns::{
    CODE_FENCE, HORIZONTAL_RULE, MINIMAL_HEADING, PRIMARY_HEADING, SENTINEL, SIMPLIFIED_HEADING,
    SUMMARY_HEADING,
};

/// A contiguous span of response text attributed to one heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Grammar that recognized the heading
    pub pass: PassKind,

    /// Number as written in the heading (e.g. "2.1")
    pub number: Option<String>,

    /// Heading text after the number, markup removed
    pub title: String,

    /// Body text, trimmed, trailing rules removed
    pub body: String,
}

impl Section {
    /// Leading component of the heading number ("2.1" → 2).
    pub fn index(&self) -> Option<u32> {
        self.number
            .as_deref()
            .and_then(|n| n.split('.').next())
            .and_then(|n| n.parse().ok())
    }
}

/// Heading grammar plus the boundaries it stops at.
struct Grammar {
    pass: PassKind,
    heading: &'static Regex,
    stop_at_summary: bool,
    stop_at_sentinel: bool,
}

/// `## Critério N: Title` headings; bodies stop at the next such heading,
/// a general-result heading, the sentinel, or end of text.
pub fn primary_pass(text: &str, skip_code_fences: bool) -> Vec<Section> {
    let grammar = Grammar {
        pass: PassKind::Primary,
        heading: &PRIMARY_HEADING,
        stop_at_summary: true,
        stop_at_sentinel: true,
    };
    scan(text, &grammar, skip_code_fences)
}

/// `N: Title` headings without sub-numbering; no general-result boundary.
pub fn simplified_pass(text: &str, skip_code_fences: bool) -> Vec<Section> {
    let grammar = Grammar {
        pass: PassKind::Simplified,
        heading: &SIMPLIFIED_HEADING,
        stop_at_summary: false,
        stop_at_sentinel: true,
    };
    scan(text, &grammar, skip_code_fences)
}

/// Loosest `N:` headings; bodies run to the next such heading or end of text.
pub fn minimal_pass(text: &str, skip_code_fences: bool) -> Vec<Section> {
    let grammar = Grammar {
        pass: PassKind::Minimal,
        heading: &MINIMAL_HEADING,
        stop_at_summary: false,
        stop_at_sentinel: false,
    };
    scan(text, &grammar, skip_code_fences)
}

/// Run the pass identified by `kind`.
pub fn run_pass(kind: PassKind, text: &str, skip_code_fences: bool) -> Vec<Section> {
    match kind {
        PassKind::Primary => primary_pass(text, skip_code_fences),
        PassKind::Simplified => simplified_pass(text, skip_code_fences),
        PassKind::Minimal => minimal_pass(text, skip_code_fences),
    }
}

/// Body of the "general result / recommendations" section, if any.
///
/// Runs from the first general-result heading to the next criterion
/// heading, the sentinel, or end of text.
pub fn summary_section(text: &str, skip_code_fences: bool) -> Option<String> {
    let mut start: Option<usize> = None;
    let mut end = text.len();

    for line in Lines::new(text, skip_code_fences) {
        if line.in_fence {
            continue;
        }
        match start {
            None if SUMMARY_HEADING.is_match(line.content) => start = Some(line.next),
            Some(_) if PRIMARY_HEADING.is_match(line.content) || SENTINEL.is_match(line.content) => {
                end = line.start;
                break;
            }
            _ => {}
        }
    }

    let body = clean_body(&text[start?..end]);
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

struct OpenSection {
    number: Option<String>,
    title: String,
    body_start: usize,
}

fn scan(text: &str, grammar: &Grammar, skip_code_fences: bool) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut open: Option<OpenSection> = None;

    for line in Lines::new(text, skip_code_fences) {
        if line.in_fence {
            continue;
        }

        if let Some(caps) = grammar.heading.captures(line.content) {
            if let Some(current) = open.take() {
                sections.push(close(grammar.pass, current, &text[..line.start]));
            }
            open = Some(OpenSection {
                number: caps.name("num").map(|m| m.as_str().to_string()),
                title: clean_title(caps.name("title").map_or("", |m| m.as_str())),
                body_start: line.next,
            });
            continue;
        }

        let boundary = (grammar.stop_at_summary && SUMMARY_HEADING.is_match(line.content))
            || (grammar.stop_at_sentinel && SENTINEL.is_match(line.content));
        if boundary {
            if let Some(current) = open.take() {
                sections.push(close(grammar.pass, current, &text[..line.start]));
            }
        }
    }

    if let Some(current) = open.take() {
        sections.push(close(grammar.pass, current, text));
    }

    sections
}

/// `prefix` is the response text up to the section's end offset.
fn close(pass: PassKind, open: OpenSection, prefix: &str) -> Section {
    let start = open.body_start.min(prefix.len());
    Section {
        pass,
        number: open.number,
        title: open.title,
        body: clean_body(&prefix[start..]),
    }
}

fn clean_title(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '`' | '#' | ':' | '-' | '–' | '—'))
        .to_string()
}

/// Trim whitespace and strip trailing horizontal rules.
pub(crate) fn clean_body(raw: &str) -> String {
    let mut body = raw.trim();
    loop {
        let last_line = body.rsplit('\n').next().unwrap_or("");
        if body.is_empty() || !HORIZONTAL_RULE.is_match(last_line.trim_end_matches('\r')) {
            break;
        }
        body = body[..body.len() - last_line.len()].trim_end();
    }
    body.to_string()
}

/// One physical line of the response.
struct Line<'a> {
    /// Text without the line terminator
    content: &'a str,
    /// Byte offset of the line start
    start: usize,
    /// Byte offset just past the line terminator
    next: usize,
    /// Inside (or delimiting) a fenced code block
    in_fence: bool,
}

struct Lines<'a> {
    text: &'a str,
    pos: usize,
    skip_code_fences: bool,
    in_fence: bool,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str, skip_code_fences: bool) -> Self {
        Self {
            text,
            pos: 0,
            skip_code_fences,
            in_fence: false,
        }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }

        let start = self.pos;
        let rest = &self.text[start..];
        let (raw, next) = match rest.find('\n') {
            Some(i) => (&rest[..i], start + i + 1),
            None => (rest, self.text.len()),
        };
        self.pos = next;

        let content = raw.strip_suffix('\r').unwrap_or(raw);
        let mut in_fence = self.in_fence;
        if self.skip_code_fences && CODE_FENCE.is_match(content) {
            // A fence that never closes (truncated output) hides nothing.
            if self.in_fence || has_closing_fence(&self.text[next..]) {
                self.in_fence = !self.in_fence;
                in_fence = true;
            }
        }

        Some(Line {
            content,
            start,
            next,
            in_fence,
        })
    }
}

fn has_closing_fence(rest: &str) -> bool {
    rest.lines().any(|line| CODE_FENCE.is_match(line))
}
