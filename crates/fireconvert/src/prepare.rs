//! Working copy of a document tree, ready for rendering.
//!
//! The copy differs from its source in three ways: subtrees in the removal
//! category are gone, comments are gone, and text outside `<pre>` has its
//! whitespace collapsed the way a browser would lay it out. The source tree is
//! only borrowed.

use crate::node::{Node, NodeRef, NodeType};
use crate::rules::Rules;
use crate::service::TurndownOptions;
use crate::utilities::{collapse_whitespace, escape_line_start, is_block, is_void};

/// Where the previous text left off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Start of a block, or just after a line break
    LineStart,
    /// Last text ended with a space
    AfterSpace,
    /// Last text or inline replaced element ended without a space
    AfterText,
}

struct Copier<'r> {
    rules: &'r Rules,
    options: &'r TurndownOptions,
    flow: Flow,
    /// Text written so far on the current output line, or `None` once markup
    /// has been written there
    line: Option<String>,
}

/// Build the pruned, whitespace-collapsed copy of `root`
pub(crate) fn working_copy(root: &Node, rules: &Rules, options: &TurndownOptions) -> Node {
    let mut copier = Copier {
        rules,
        options,
        flow: Flow::LineStart,
        line: Some(String::new()),
    };
    let mut ancestors = Vec::new();
    copier
        .copy_node(root, &mut ancestors, false)
        .unwrap_or_else(Node::document)
}

impl Copier<'_> {
    fn copy_node<'a>(
        &mut self,
        node: &'a Node,
        ancestors: &mut Vec<&'a Node>,
        in_pre: bool,
    ) -> Option<Node> {
        match node.node_type {
            NodeType::Comment => None,
            NodeType::Text if in_pre => Some(node.clone()),
            NodeType::Text => self.copy_text(node),
            NodeType::Document => {
                let mut copy = node.shallow_clone();
                copy.children = self.copy_children(node, ancestors, in_pre);
                Some(copy)
            }
            NodeType::Element => {
                if self
                    .rules
                    .should_remove(&NodeRef::with_ancestors(node, ancestors), self.options)
                {
                    return None;
                }

                let tag = node.tag_name();
                let breaks_line = is_block(tag) || tag == "br";
                if breaks_line {
                    self.start_line();
                } else if is_void(tag) || self.writes_markup(node, ancestors) {
                    self.line = None;
                }

                let mut copy = node.shallow_clone();
                copy.children = self.copy_children(node, ancestors, in_pre || tag == "pre");

                if breaks_line {
                    self.start_line();
                } else if is_void(tag) {
                    self.flow = Flow::AfterText;
                }
                Some(copy)
            }
        }
    }

    fn start_line(&mut self) {
        self.flow = Flow::LineStart;
        self.line = Some(String::new());
    }

    /// Whether an inline element renders delimiters or markup of its own
    fn writes_markup(&self, node: &Node, ancestors: &[&Node]) -> bool {
        let node_ref = NodeRef::with_ancestors(node, ancestors);
        self.rules.for_node(&node_ref, self.options).is_some()
            || self.rules.should_keep(&node_ref, self.options)
    }

    fn copy_children<'a>(
        &mut self,
        node: &'a Node,
        ancestors: &mut Vec<&'a Node>,
        in_pre: bool,
    ) -> Vec<Node> {
        ancestors.push(node);
        let children = node
            .children()
            .filter_map(|child| self.copy_node(child, ancestors, in_pre))
            .collect();
        ancestors.pop();
        children
    }

    fn copy_text(&mut self, node: &Node) -> Option<Node> {
        let collapsed = collapse_whitespace(node.node_value.as_deref().unwrap_or_default());
        let text = match self.flow {
            Flow::LineStart | Flow::AfterSpace => collapsed.trim_start_matches(' '),
            Flow::AfterText => collapsed.as_str(),
        };
        if text.is_empty() {
            return None;
        }

        self.flow = if text.ends_with(' ') {
            Flow::AfterSpace
        } else {
            Flow::AfterText
        };

        let Some(line) = self.line.as_mut() else {
            return Some(Node::text(text));
        };
        let escaped = escape_line_start(line, text);
        line.push_str(text);
        Some(Node::text(&escaped))
    }
}
