//! CommonMark rules (plus the GFM table, strikethrough and task-list extensions).

use super::{Filter, Rule};
use crate::node::{Node, NodeRef};
use crate::service::{CodeBlockStyle, HeadingStyle, TurndownOptions};
use std::num::IntErrorKind;

use crate::utilities::{
    clean_attribute, escape_inline, escape_pipes, indent_continuation, longest_run, trim_block,
};

/// Indentation for list item continuation lines and nested lists
const LIST_INDENT: &str = "    ";

/// CommonMark list ordinals have at most nine digits
const MAX_ORDINAL: u64 = 999_999_999;

/// Create all built-in rules, in lookup order
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        task_list_marker_rule(),
        code_block_rule(),
        horizontal_rule(),
        link_rule(),
        emphasis_rule(),
        strong_rule(),
        strikethrough_rule(),
        code_rule(),
        image_rule(),
        table_cell_rule(),
        table_row_rule(),
        table_section_rule(),
        table_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| {
        let content = trim_block(content);
        if content.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", content)
    })
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, options| format!("{}\n", options.br))
}

fn heading_rule() -> Rule {
    Rule::for_tags(&["h1", "h2", "h3", "h4", "h5", "h6"], |node, content, options| {
        let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

        let content = trim_block(content).replace('\n', " ");
        let content = content.trim();
        if content.is_empty() {
            return String::new();
        }

        match options.heading_style {
            HeadingStyle::Setext if level <= 2 => {
                let underline = if level == 1 { "=" } else { "-" };
                format!(
                    "\n\n{}\n{}\n\n",
                    content,
                    underline.repeat(content.chars().count())
                )
            }
            _ => format!("\n\n{} {}\n\n", "#".repeat(level), content),
        }
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let content = trim_block(content);
        if content.is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = content
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |node, content, _| {
        let content = trim_block(content);
        if content.is_empty() {
            return String::new();
        }

        // A list closing its parent item hangs off the item's first line
        if node.parent_tag() == Some("li") && node.is_last_element_child() {
            format!("\n{}", content)
        } else {
            format!("\n\n{}\n\n", content)
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |node, content, options| {
        let content = indent_continuation(&squash_task_marker(trim_block(content)), LIST_INDENT);

        let prefix = if node.parent_tag() == Some("ol") {
            let start = list_start(node.parent().and_then(|ol| ol.attr("start")));
            let index = node
                .sibling_index(|n| n.is_element() && n.tag_name() == "li")
                .unwrap_or(0) as u64;
            format!("{}. ", start.saturating_add(index).min(MAX_ORDINAL))
        } else {
            format!("{} ", options.bullet_list_marker)
        };

        format!("{}{}\n", prefix, content)
    })
}

/// Value of an `ol` `start` attribute, clamped to a valid ordinal
fn list_start(value: Option<&str>) -> u64 {
    match value.map(|v| v.trim().parse::<u64>()) {
        Some(Ok(start)) => start.min(MAX_ORDINAL),
        Some(Err(err)) if *err.kind() == IntErrorKind::PosOverflow => MAX_ORDINAL,
        _ => 1,
    }
}

/// The task marker brings its own space; drop the one from the source text
fn squash_task_marker(content: &str) -> String {
    for marker in ["[x]", "[ ]"] {
        if let Some(rest) = content.strip_prefix(marker) {
            return format!("{} {}", marker, rest.trim_start());
        }
    }
    content.to_string()
}

fn task_list_marker_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            tag == "input"
                && node
                    .attr("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
                && node.parent_tag() == Some("li")
        }),
        |node, _, _| {
            if node.has_attr("checked") {
                "[x] ".to_string()
            } else {
                "[ ] ".to_string()
            }
        },
    )
}

fn code_block_rule() -> Rule {
    Rule::for_tag("pre", |node, _, options| {
        let code = node.text_content();
        let code = code.trim_end_matches('\n');
        if code.trim().is_empty() {
            return String::new();
        }

        match options.code_block_style {
            CodeBlockStyle::Indented => {
                let indented: Vec<String> = code
                    .split('\n')
                    .map(|line| {
                        if line.is_empty() {
                            String::new()
                        } else {
                            format!("    {}", line)
                        }
                    })
                    .collect();
                format!("\n\n{}\n\n", indented.join("\n"))
            }
            CodeBlockStyle::Fenced => {
                let language = node
                    .element_children()
                    .find(|c| c.tag_name() == "code")
                    .and_then(code_language)
                    .unwrap_or_default();

                let fence = fence_for(code, &options.fence);
                format!("\n\n{fence}{language}\n{code}\n{fence}\n\n")
            }
        }
    })
}

/// Language named by a `language-*` or `lang-*` class
fn code_language(code: &Node) -> Option<String> {
    code.attr("class")?
        .split_whitespace()
        .find_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
        .map(str::to_string)
}

/// Lengthen the fence so no line of the code can close it early
fn fence_for(code: &str, fence: &str) -> String {
    let Some(fence_char) = fence.chars().next() else {
        return "```".to_string();
    };
    let needed = longest_run(code, fence_char) + 1;
    let len = fence.chars().count().max(needed).max(3);
    fence_char.to_string().repeat(len)
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, options| format!("\n\n{}\n\n", options.hr))
}

fn link_rule() -> Rule {
    Rule::for_tag("a", |node, content, _| {
        let Some(href) = clean_attribute(node.attr("href")) else {
            return content.to_string();
        };

        let href = href.replace('(', "\\(").replace(')', "\\)");
        let href = if href.contains(' ') {
            format!("<{}>", href)
        } else {
            href
        };
        let title_part = clean_attribute(node.attr("title"))
            .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
            .unwrap_or_default();

        format!("[{}]({}{})", content.trim(), href, title_part)
    })
}

/// Wrap inline content in a delimiter, moving flanking whitespace outside it
fn delimit(content: &str, open: &str, close: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_string();
    }
    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    format!("{leading}{open}{trimmed}{close}{trailing}")
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, options| {
        let delimiter = options.em_delimiter.to_string();
        delimit(content, &delimiter, &delimiter)
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, options| {
        delimit(content, &options.strong_delimiter, &options.strong_delimiter)
    })
}

fn strikethrough_rule() -> Rule {
    Rule::for_tags(&["del", "s", "strike"], |_, content, _| delimit(content, "~~", "~~"))
}

fn code_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            matches!(tag, "code" | "kbd" | "samp" | "tt") && !node.has_ancestor("pre")
        }),
        |node, _, _| {
            let code = node.text_content();
            if code.is_empty() {
                return String::new();
            }

            let backticks = "`".repeat(longest_run(&code, '`') + 1);
            let space = if code.starts_with('`') || code.ends_with('`') {
                " "
            } else {
                ""
            };

            format!("{backticks}{space}{code}{space}{backticks}")
        },
    )
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, _| {
        let Some(src) = clean_attribute(node.attr("src")) else {
            return String::new();
        };
        let alt = clean_attribute(node.attr("alt"))
            .map(|alt| escape_inline(&alt))
            .unwrap_or_default();
        let title_part = clean_attribute(node.attr("title"))
            .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
            .unwrap_or_default();

        format!("![{}]({}{})", alt, src, title_part)
    })
}

fn is_cell(node: &Node) -> bool {
    node.is_element() && matches!(node.tag_name(), "th" | "td")
}

/// First row with cells in a table, not looking inside nested tables
fn first_row(node: &Node) -> Option<&Node> {
    node.element_children().find_map(|child| match child.tag_name() {
        "tr" => child.children().any(is_cell).then_some(child),
        "table" => None,
        _ => first_row(child),
    })
}

fn is_header_row(node: &NodeRef) -> bool {
    node.closest("table")
        .and_then(first_row)
        .is_some_and(|row| std::ptr::eq(row, node.node))
}

fn table_cell_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| matches!(tag, "th" | "td") && node.has_ancestor("table")),
        |node, content, _| {
            let cell = escape_pipes(trim_block(content).replace('\n', " ").trim());
            let first = node.sibling_index(is_cell) == Some(0);
            let prefix = if first { "| " } else { " " };
            format!("{}{} |", prefix, cell)
        },
    )
}

fn table_row_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| tag == "tr" && node.has_ancestor("table")),
        |node, content, _| {
            let cells = node.children().filter(|n| is_cell(n)).count();
            if cells == 0 {
                return String::new();
            }

            let mut row = format!("\n{}", content.trim());
            if is_header_row(node) {
                row.push_str("\n|");
                for _ in 0..cells {
                    row.push_str(" --- |");
                }
            }
            row
        },
    )
}

fn table_section_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            matches!(tag, "thead" | "tbody" | "tfoot") && node.parent_tag() == Some("table")
        }),
        |_, content, _| content.to_string(),
    )
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |_, content, _| {
        let content = trim_block(content);
        if content.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", content)
    })
}
