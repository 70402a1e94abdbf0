//! Element tables, text escaping and fragment joining.

use once_cell::sync::Lazy;
use regex::Regex;

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "caption", "center", "dd", "details", "dialog", "dir", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "frameset", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html", "isindex",
    "li", "main", "menu", "nav", "noframes", "noscript", "ol", "output", "p",
    "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "ul", "video",
];

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Characters escaped wherever they appear in text
const INLINE_ESCAPES: &[char] = &['*', '_', '`', '[', ']'];

/// Line-start patterns that would otherwise open a block construct
static LINE_START_ESCAPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"^(#{1,6})", r"\$1"),
        (r"^(=+)", r"\$1"),
        (r"^-", r"\-"),
        (r"^\+(\s|$)", r"\+$1"),
        (r"^>", r"\>"),
        (r"^(\d+)([.)])(\s|$)", r"$1\$2$3"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("line-start escape pattern is valid"),
            replacement,
        )
    })
    .collect()
});

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag)
}

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Escape Markdown-sensitive characters in a run of text.
///
/// The text is treated as the start of a line. A character that is already
/// preceded by a backslash is left alone, so escaping text that was escaped
/// before yields the same string.
pub fn escape_markdown(text: &str) -> String {
    escape_line_start("", &escape_inline(text))
}

/// Escape the characters that are special anywhere on a line
pub(crate) fn escape_inline(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            result.push(c);
            if let Some(next) = chars.next_if(|n| n.is_ascii_punctuation()) {
                result.push(next);
            }
            continue;
        }
        if INLINE_ESCAPES.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

/// Escape `text` where, written after `line` on the same output line, it
/// would open a block construct.
///
/// Only a backslash inside `text` is added; `line` has already been written.
pub(crate) fn escape_line_start(line: &str, text: &str) -> String {
    let combined = format!("{line}{text}");
    let Some(at) = LINE_START_ESCAPES
        .iter()
        .find_map(|(pattern, replacement)| {
            pattern
                .is_match(&combined)
                .then(|| pattern.replace(&combined, *replacement))
        })
        .and_then(|escaped| first_difference(&combined, &escaped))
    else {
        return text.to_string();
    };

    match at.checked_sub(line.len()) {
        Some(offset) => {
            let mut result = String::with_capacity(text.len() + 1);
            result.push_str(&text[..offset]);
            result.push('\\');
            result.push_str(&text[offset..]);
            result
        }
        None => text.to_string(),
    }
}

/// Byte offset of the first differing character
fn first_difference(a: &str, b: &str) -> Option<usize> {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((i, _), _)| i)
}

/// Escape `|` so a cell cannot split a table row
pub fn escape_pipes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev = None;
    for c in text.chars() {
        if c == '|' && prev != Some('\\') {
            result.push('\\');
        }
        result.push(c);
        prev = Some(c);
    }
    result
}

/// Clean an attribute value (trim, empty means absent)
pub fn clean_attribute(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().replace(['\n', '\r'], " "))
        .filter(|v| !v.is_empty())
}

/// Collapse whitespace runs to a single space
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Append a rendered fragment to `output`.
///
/// Newlines at the seam are merged: the separator is the longer of the two
/// newline runs, capped at one blank line. Spaces left dangling before a block
/// boundary are dropped.
pub fn join_fragments(output: &mut String, fragment: &str) {
    let body = fragment.trim_start_matches('\n');
    let leading = fragment.len() - body.len();

    let kept = output.trim_end_matches('\n').len();
    let trailing = output.len() - kept;
    output.truncate(kept);

    if leading > 0 {
        let kept = output.trim_end_matches([' ', '\t']).len();
        output.truncate(kept);
    }

    for _ in 0..leading.max(trailing).min(2) {
        output.push('\n');
    }
    output.push_str(body);
}

/// Trim surrounding newlines and trailing whitespace from block content
pub fn trim_block(content: &str) -> &str {
    content.trim_start_matches('\n').trim_end()
}

/// Prefix every non-empty line after the first with `indent`
pub fn indent_continuation(content: &str, indent: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(indent);
            }
        }
        out.push_str(line);
    }
    out
}

/// Length of the longest run of `c` in `s`
pub fn longest_run(s: &str, c: char) -> usize {
    s.chars()
        .fold((0, 0), |(max, current), ch| {
            if ch == c {
                (max.max(current + 1), current + 1)
            } else {
                (max, 0)
            }
        })
        .0
}
