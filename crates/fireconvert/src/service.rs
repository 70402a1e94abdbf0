//! TurndownService - the main entry point for HTML to Markdown conversion.

use tracing::debug;

use crate::html::parse_html;
use crate::node::{Node, NodeRef, NodeType};
use crate::prepare::working_copy;
use crate::rules::{Filter, Rule, Rules};
use crate::utilities::{escape_inline, escape_markdown, is_block, join_fragments};
use crate::Result;

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    Setext,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
    /// Use indented code blocks (4 spaces)
    Indented,
}

/// Options for TurndownService, fixed when the service is built
#[derive(Debug, Clone)]
pub struct TurndownOptions {
    /// Heading style (atx or setext)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Written before the newline of a hard line break
    pub br: String,
}

impl Default for TurndownOptions {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            hr: "---".to_string(),
            bullet_list_marker: '-',
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            em_delimiter: '*',
            strong_delimiter: "**".to_string(),
            br: "  ".to_string(),
        }
    }
}

/// The main service for converting HTML to Markdown.
///
/// A service is configured once (options, rules, removal set) and can then
/// convert any number of documents. Conversions share no mutable state, so a
/// configured service may be used from several threads at once.
pub struct TurndownService {
    options: TurndownOptions,
    rules: Rules,
}

impl TurndownService {
    /// Create a new TurndownService with default options
    pub fn new() -> Self {
        Self::with_options(TurndownOptions::default())
    }

    /// Create a TurndownService with custom options
    pub fn with_options(options: TurndownOptions) -> Self {
        Self {
            options,
            rules: Rules::new(),
        }
    }

    /// Convert an HTML string to Markdown
    pub fn turndown(&self, html: &str) -> Result<String> {
        debug!(input_len = html.len(), "converting html");
        let document = parse_html(html);
        self.turndown_node(&document)
    }

    /// Convert raw bytes, which must be UTF-8 encoded HTML
    pub fn turndown_bytes(&self, html: &[u8]) -> Result<String> {
        let html = std::str::from_utf8(html)?;
        self.turndown(html)
    }

    /// Convert an already parsed tree; the tree itself is left untouched
    pub fn turndown_node(&self, node: &Node) -> Result<String> {
        let root = working_copy(node, &self.rules, &self.options);

        let mut ancestors = Vec::new();
        let output = match root.node_type {
            NodeType::Element => self.process_element(&root, &mut ancestors),
            NodeType::Text => self.process_text(&root, &ancestors),
            NodeType::Comment => String::new(),
            NodeType::Document => self.process_children(&root, &mut ancestors),
        };

        let markdown = post_process(&output);
        debug!(output_len = markdown.len(), "converted html");
        Ok(markdown)
    }

    /// Add a custom rule
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Keep elements matching the filter as HTML
    pub fn keep(&mut self, filter: Filter) -> &mut Self {
        self.rules.keep(filter);
        self
    }

    /// Remove elements matching the filter, with their content
    pub fn remove(&mut self, filter: Filter) -> &mut Self {
        self.rules.remove(filter);
        self
    }

    /// Add a tag to the removal set
    pub fn exclude(&mut self, tag: &str) -> &mut Self {
        self.rules.exclude(tag);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        escape_markdown(text)
    }

    /// Get the current options
    pub fn options(&self) -> &TurndownOptions {
        &self.options
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Render the children of `node` and join the fragments
    fn process_children<'a>(&self, node: &'a Node, ancestors: &mut Vec<&'a Node>) -> String {
        ancestors.push(node);
        let mut output = String::new();

        for child in node.children() {
            let replacement = match child.node_type {
                NodeType::Text => self.process_text(child, ancestors),
                NodeType::Element => self.process_element(child, ancestors),
                _ => continue,
            };
            join_fragments(&mut output, &replacement);
        }

        ancestors.pop();
        output
    }

    fn process_text(&self, node: &Node, ancestors: &[&Node]) -> String {
        let text = node.node_value.as_deref().unwrap_or_default();
        let in_pre = ancestors
            .iter()
            .any(|a| a.is_element() && a.tag_name() == "pre");

        // Line-start escapes were added with the working copy
        if in_pre {
            text.to_string()
        } else {
            escape_inline(text)
        }
    }

    /// Process a single element: children first, then the matching rule
    fn process_element<'a>(&self, node: &'a Node, ancestors: &mut Vec<&'a Node>) -> String {
        let node_ref = NodeRef::with_ancestors(node, ancestors);
        if self.rules.should_keep(&node_ref, &self.options) {
            return self.rules.keep_replacement(&node_ref);
        }

        let content = self.process_children(node, ancestors);

        let node_ref = NodeRef::with_ancestors(node, ancestors);
        if let Some(rule) = self.rules.for_node(&node_ref, &self.options) {
            return rule.replace(&node_ref, &content, &self.options);
        }

        // Default: children as-is, separated like a block where the tag is one
        if is_block(node.tag_name()) {
            format!("\n\n{}\n\n", content.trim_end_matches(' '))
        } else {
            content
        }
    }
}

impl Default for TurndownService {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim leading blank lines and trailing whitespace from the document
fn post_process(output: &str) -> String {
    output.trim_start_matches('\n').trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn convert(html: &str) -> String {
        TurndownService::new().turndown(html).unwrap()
    }

    #[test]
    fn test_simple_paragraph() {
        assert_eq!(convert("<p>Hello World</p>"), "Hello World");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(convert(""), "");
        assert_eq!(convert("   \n  "), "");
        assert_eq!(convert("<p></p><div> </div>"), "");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(convert("just some text"), "just some text");
    }

    #[test]
    fn test_heading_atx() {
        assert_eq!(convert("<h2>Title</h2>"), "## Title");
        assert_eq!(convert("<h6>Deep</h6>"), "###### Deep");
    }

    #[test]
    fn test_heading_setext() {
        let options = TurndownOptions {
            heading_style: HeadingStyle::Setext,
            ..Default::default()
        };
        let service = TurndownService::with_options(options);
        assert_eq!(service.turndown("<h1>Title</h1>").unwrap(), "Title\n=====");
        assert_eq!(service.turndown("<h2>Sub</h2>").unwrap(), "Sub\n---");
        assert_eq!(service.turndown("<h3>Small</h3>").unwrap(), "### Small");
    }

    #[test]
    fn test_emphasis_and_strong() {
        assert_eq!(convert("<em>emphasized</em>"), "*emphasized*");
        assert_eq!(convert("<b>bold</b>"), "**bold**");
        assert_eq!(
            convert("<p>Hello <strong>World</strong></p>"),
            "Hello **World**"
        );
        assert_eq!(convert("<p>a<em> spaced </em>b</p>"), "a *spaced* b");
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(convert("<p><del>gone</del> here</p>"), "~~gone~~ here");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            convert(r#"<a href="https://x.com">text</a>"#),
            "[text](https://x.com)"
        );
        assert_eq!(convert("<a>text</a>"), "text");
        assert_eq!(convert(r#"<a href="  ">text</a>"#), "text");
        assert_eq!(
            convert(r#"<a href="https://x.com/a_(b)" title="Say &quot;hi&quot;">t</a>"#),
            r#"[t](https://x.com/a_\(b\) "Say \"hi\"")"#
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            convert(r#"<img src="test.png" alt="Alt">"#),
            "![Alt](test.png)"
        );
        assert_eq!(
            convert(r#"<img src="a.png" alt="" title="T">"#),
            r#"![](a.png "T")"#
        );
        assert_eq!(convert(r#"<img alt="no source">"#), "");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(convert("<p>Use <code>x_y*</code> here</p>"), "Use `x_y*` here");
        assert_eq!(convert("<code>a`b</code>"), "``a`b``");
        assert_eq!(convert("<code>`tick</code>"), "`` `tick ``");
        assert_eq!(convert("<kbd>Ctrl</kbd>"), "`Ctrl`");
    }

    #[test]
    fn test_fenced_code_block() {
        let html = "<pre><code class=\"language-rust\">fn main() {\n    let x = a * b;\n}\n</code></pre>";
        assert_eq!(
            convert(html),
            "```rust\nfn main() {\n    let x = a * b;\n}\n```"
        );
    }

    #[test]
    fn test_code_block_keeps_blank_lines() {
        let html = "<pre>one\n\n\n\ntwo</pre>";
        assert_eq!(convert(html), "```\none\n\n\n\ntwo\n```");
    }

    #[test]
    fn test_fence_grows_past_backticks() {
        let html = "<pre><code>```\ninner\n```</code></pre>";
        assert_eq!(convert(html), "````\n```\ninner\n```\n````");
    }

    #[test]
    fn test_indented_code_block() {
        let options = TurndownOptions {
            code_block_style: CodeBlockStyle::Indented,
            ..Default::default()
        };
        let service = TurndownService::with_options(options);
        let result = service
            .turndown("<p>Example:</p><pre><code>function() {}\n\nreturn;</code></pre>")
            .unwrap();
        assert_eq!(result, "Example:\n\n    function() {}\n\n    return;");
    }

    #[test]
    fn test_horizontal_rule() {
        assert_eq!(convert("<p>a</p><hr><p>b</p>"), "a\n\n---\n\nb");
    }

    #[test]
    fn test_line_break() {
        assert_eq!(convert("<p>one<br>two</p>"), "one  \ntwo");
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            convert("<blockquote><p>Quote</p><p>More</p></blockquote>"),
            "> Quote\n>\n> More"
        );
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(convert("<ul><li>a</li><li>b</li></ul>"), "- a\n- b");
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(
            convert("<ol><li>One</li><li>Two</li></ol>"),
            "1. One\n2. Two"
        );
        assert_eq!(
            convert("<ol start=\"7\"><li>Seven</li><li>Eight</li></ol><ol><li>Again</li></ol>"),
            "7. Seven\n8. Eight\n\n1. Again"
        );
    }

    #[test]
    fn test_nested_list() {
        let html = "<ul>\n  <li>Fruit\n    <ul>\n      <li>Apple</li>\n      <li>Pear</li>\n    </ul>\n  </li>\n  <li>Veg</li>\n</ul>";
        assert_eq!(convert(html), "- Fruit\n    - Apple\n    - Pear\n- Veg");
    }

    #[test]
    fn test_loose_list_item() {
        let html = "<ul><li><p>First para</p><p>Second para</p></li></ul>";
        assert_eq!(convert(html), "- First para\n\n    Second para");
    }

    #[test]
    fn test_task_list() {
        let html = r#"<ul><li><input type="checkbox" checked> done</li><li><input type="checkbox">todo</li></ul>"#;
        assert_eq!(convert(html), "- [x] done\n- [ ] todo");
    }

    #[test]
    fn test_table() {
        let html = "<table><tr><th>Name</th><th>Age</th></tr><tr><td>Ann</td><td>30</td></tr></table>";
        assert_eq!(convert(html), "| Name | Age |\n| --- | --- |\n| Ann | 30 |");
    }

    #[test]
    fn test_table_with_sections_and_pipes() {
        let html = "<table>\n<thead><tr><th>A</th><th>B</th></tr></thead>\n<tbody>\n<tr><td>x | y</td><td><p>z</p></td></tr>\n<tr><td>1</td><td>2</td></tr>\n</tbody></table>";
        assert_eq!(
            convert(html),
            "| A | B |\n| --- | --- |\n| x \\| y | z |\n| 1 | 2 |"
        );
    }

    #[test]
    fn test_huge_list_start_is_clamped() {
        assert_eq!(
            convert(r#"<ol start="18446744073709551615"><li>a</li><li>b</li></ol>"#),
            "999999999. a\n999999999. b"
        );
        assert_eq!(
            convert(r#"<ol start="999999998"><li>a</li><li>b</li><li>c</li></ol>"#),
            "999999998. a\n999999999. b\n999999999. c"
        );
    }

    #[test]
    fn test_table_header_skips_empty_rows() {
        let html = "<table><tr></tr><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>";
        assert_eq!(convert(html), "| a | b |\n| --- | --- |\n| c | d |");
    }

    #[test]
    fn test_image_alt_is_escaped() {
        assert_eq!(
            convert(r#"<img src="s.png" alt="a]b [c] *d*">"#),
            r"![a\]b \[c\] \*d\*](s.png)"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(convert("*bold* not bold"), "\\*bold\\* not bold");
        assert_eq!(convert("<p>1. not a list</p>"), "1\\. not a list");
        assert_eq!(convert("<p># not a heading</p>"), "\\# not a heading");
    }

    #[test]
    fn test_line_start_escape_across_inline_elements() {
        assert_eq!(convert("<p><span>1</span>. item</p>"), "1\\. item");
        assert_eq!(convert("<p><span>2024</span>. A year</p>"), "2024\\. A year");
        assert_eq!(convert("<p><span>#</span> tag</p>"), "\\# tag");
    }

    #[test]
    fn test_mid_line_text_is_not_line_start_escaped() {
        assert_eq!(convert(r#"<p><a href="u">x</a>- y</p>"#), "[x](u)- y");
        assert_eq!(convert("<p><b>1</b>. bold</p>"), "**1**. bold");
    }

    #[test]
    fn test_list_item_text_is_line_start_escaped() {
        assert_eq!(convert("<ul><li>1. not nested</li></ul>"), "- 1\\. not nested");
    }

    #[test]
    fn test_escaping_is_idempotent() {
        let once = convert("*bold* not bold");
        let twice = convert(&format!("<p>{once}</p>"));
        assert_eq!(twice, once);
    }

    #[test]
    fn test_whitespace_collapses() {
        let html = "<div>\n  <p>  Lots   of\n   space </p>\n\n  <p>next</p>\n</div>";
        assert_eq!(convert(html), "Lots of space\n\nnext");
    }

    #[test]
    fn test_pre_whitespace_is_kept() {
        assert_eq!(convert("<pre>  a   b\n c</pre>"), "```\n  a   b\n c\n```");
    }

    #[test]
    fn test_block_spacing() {
        let html = "<h1>T</h1><p>a</p><div>b</div>text<p>c</p>";
        assert_eq!(convert(html), "# T\n\na\n\nb\n\ntext\n\nc");
    }

    #[test]
    fn test_default_removal_set() {
        assert_eq!(convert("<p>keep</p><script>evil()</script>"), "keep");
        assert_eq!(
            convert("<style>p { color: red }</style><p>a</p><noscript>enable js</noscript>"),
            "a"
        );
    }

    #[test]
    fn test_comments_are_ignored() {
        assert_eq!(convert("<p>a<!-- hidden -->b</p>"), "ab");
    }

    #[test]
    fn test_exclude_extends_removal_set() {
        let mut service = TurndownService::new();
        service.exclude("nav").exclude("footer");
        let result = service
            .turndown("<nav><a href=\"/\">Home</a></nav><p>Body</p><footer>(c)</footer>")
            .unwrap();
        assert_eq!(result, "Body");
    }

    #[test]
    fn test_removal_beats_custom_rules() {
        let mut service = TurndownService::new();
        service.add_rule("script", Rule::for_tag("script", |_, c, _| c.to_string()));
        assert_eq!(service.turndown("<p>a</p><script>x()</script>").unwrap(), "a");
    }

    #[test]
    fn test_custom_rule_first_registered_wins() {
        let mut service = TurndownService::new();
        service
            .add_rule("upper", Rule::for_tag("span", |_, c, _| c.to_uppercase()))
            .add_rule("lower", Rule::for_tag("span", |_, c, _| c.to_lowercase()));
        assert_eq!(service.turndown("<span>MiXed</span>").unwrap(), "MIXED");
    }

    #[test]
    fn test_custom_rule_with_attribute_predicate() {
        let mut service = TurndownService::new();
        service.add_rule(
            "callout",
            Rule::new(
                Filter::predicate(|tag, node, _| tag == "div" && node.node.has_class("note")),
                |_, content, _| format!("\n\n> **Note:** {}\n\n", content.trim()),
            ),
        );
        let result = service
            .turndown("<div class=\"note\">Read this</div><div>Plain</div>")
            .unwrap();
        assert_eq!(result, "> **Note:** Read this\n\nPlain");
    }

    #[test]
    fn test_keep_as_html() {
        let mut service = TurndownService::new();
        service.keep(Filter::tags(&["sup", "em"]));
        let result = service
            .turndown("<p>x<sup>2</sup> and <em>e</em></p>")
            .unwrap();
        assert_eq!(result, "x<sup>2</sup> and *e*");
    }

    #[test]
    fn test_use_plugin() {
        let mut service = TurndownService::new();
        service.use_plugin(|s| {
            s.add_rule("mark", Rule::for_tag("mark", |_, c, _| format!("=={c}==")));
            s.exclude("aside");
        });
        let result = service
            .turndown("<p><mark>hi</mark></p><aside>side</aside>")
            .unwrap();
        assert_eq!(result, "==hi==");
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(convert("<p>text"), "text");
        assert_eq!(convert("<ul><li>a<li>b</ul>"), "- a\n- b");
        assert_eq!(convert("<b><i>x</b></i>"), "***x***");
    }

    #[test]
    fn test_turndown_bytes() {
        let service = TurndownService::new();
        assert_eq!(service.turndown_bytes(b"<p>ok</p>").unwrap(), "ok");
        assert!(matches!(
            service.turndown_bytes(&[0x3c, 0x70, 0xff, 0xfe]),
            Err(crate::ConvertError::Parse(_))
        ));
    }

    #[test]
    fn test_turndown_node_leaves_input_untouched() {
        let mut div = Node::element("div");
        div.add_child(Node::text("  keep   this "));
        let mut script = Node::element("script");
        script.add_child(Node::text("x()"));
        div.add_child(script);
        let before = div.clone();

        let result = TurndownService::new().turndown_node(&div).unwrap();
        assert_eq!(result, "keep this");
        assert_eq!(div, before);
    }

    #[test]
    fn test_service_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TurndownService>();

        let service = std::sync::Arc::new(TurndownService::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let service = service.clone();
                std::thread::spawn(move || service.turndown(&format!("<h1>Doc {i}</h1>")).unwrap())
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("# Doc {i}"));
        }
    }
}
