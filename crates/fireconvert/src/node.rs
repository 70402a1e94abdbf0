//! Document tree used by the converter.
//!
//! [`parse_html`](crate::parse_html) produces this tree, but nodes can just as
//! well be built by hand. Every node owns its children, so a tree is a plain
//! value that can be cloned, filtered and dropped without any arena.

use indexmap::IndexMap;

use crate::utilities::is_void;

/// Kinds of node in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Element with a tag name, attributes and children
    Element,
    /// Character data
    Text,
    /// Comment, never rendered
    Comment,
    /// Root of a parsed document
    Document,
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What kind of node this is
    pub node_type: NodeType,

    /// Lowercase tag name for elements; `#text`, `#comment` or `#document` otherwise
    pub node_name: String,

    /// Character content for text and comment nodes
    pub node_value: Option<String>,

    /// Attributes in source order (elements only)
    pub attributes: IndexMap<String, String>,

    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            node_name: tag_name.to_lowercase(),
            node_value: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs<'a, I>(tag_name: &str, attrs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut node = Self::element(tag_name);
        for (name, value) in attrs {
            node.set_attr(name, value);
        }
        node
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::leaf(NodeType::Text, "#text", content)
    }

    /// Create a new comment node
    pub fn comment(content: &str) -> Self {
        Self::leaf(NodeType::Comment, "#comment", content)
    }

    /// Create an empty document root
    pub fn document() -> Self {
        Self {
            node_type: NodeType::Document,
            node_name: "#document".to_string(),
            node_value: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    fn leaf(node_type: NodeType, name: &str, content: &str) -> Self {
        Self {
            node_type,
            node_name: name.to_string(),
            node_value: Some(content.to_string()),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Copy of this node without its children
    pub(crate) fn shallow_clone(&self) -> Self {
        Self {
            node_type: self.node_type,
            node_name: self.node_name.clone(),
            node_value: self.node_value.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Tag name for elements, node name otherwise
    pub fn tag_name(&self) -> &str {
        &self.node_name
    }

    /// Get an attribute value by name (case-insensitive)
    pub fn attr(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.attributes.get(name) {
            return Some(value.as_str());
        }
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, keeping the position of an existing one
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes
            .insert(name.to_lowercase(), value.to_string());
    }

    /// Whether the space separated `class` attribute contains `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.node_type {
            NodeType::Text => out.push_str(self.node_value.as_deref().unwrap_or_default()),
            NodeType::Comment => {}
            _ => {
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Serialize this node back to HTML (used by keep filters)
    pub fn outer_html(&self) -> String {
        match self.node_type {
            NodeType::Text => escape_html_text(self.node_value.as_deref().unwrap_or_default()),
            NodeType::Comment => format!("<!--{}-->", self.node_value.as_deref().unwrap_or_default()),
            NodeType::Element => {
                let tag = self.tag_name();
                let attrs = self.attributes_string();
                let open = if attrs.is_empty() {
                    format!("<{tag}>")
                } else {
                    format!("<{tag} {attrs}>")
                };

                if is_void(tag) {
                    open
                } else {
                    format!("{open}{}</{tag}>", self.inner_html())
                }
            }
            NodeType::Document => self.inner_html(),
        }
    }

    pub fn inner_html(&self) -> String {
        self.children().map(Node::outer_html).collect()
    }

    fn attributes_string(&self) -> String {
        self.attributes
            .iter()
            .map(|(name, value)| {
                if value.is_empty() {
                    name.clone()
                } else {
                    format!("{}=\"{}\"", name, escape_html_attr(value))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_html_attr(s: &str) -> String {
    escape_html_text(s).replace('"', "&quot;")
}

/// A node together with the chain of nodes above it.
///
/// Nodes do not store parent pointers, so the renderer hands each rule a
/// `NodeRef` carrying the ancestors it walked through (root first).
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub node: &'a Node,
    ancestors: &'a [&'a Node],
}

impl<'a> NodeRef<'a> {
    /// A node with no known ancestors
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            ancestors: &[],
        }
    }

    pub fn with_ancestors(node: &'a Node, ancestors: &'a [&'a Node]) -> Self {
        Self { node, ancestors }
    }

    pub fn parent(&self) -> Option<&'a Node> {
        self.ancestors.last().copied()
    }

    /// Tag name of the parent element, if the parent is an element
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent()
            .filter(|p| p.is_element())
            .map(|p| p.tag_name())
    }

    /// Ancestors from the root down to the parent
    pub fn ancestors(&self) -> &'a [&'a Node] {
        self.ancestors
    }

    /// Nearest enclosing element with the given tag
    pub fn closest(&self, tag: &str) -> Option<&'a Node> {
        self.ancestors
            .iter()
            .rev()
            .copied()
            .find(|n| n.is_element() && n.tag_name() == tag)
    }

    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.closest(tag).is_some()
    }

    /// Position of this node among the parent's children accepted by `filter`
    pub fn sibling_index<F>(&self, filter: F) -> Option<usize>
    where
        F: Fn(&Node) -> bool,
    {
        self.parent()?
            .children()
            .filter(|n| filter(n))
            .position(|n| std::ptr::eq(n, self.node))
    }

    pub fn is_last_element_child(&self) -> bool {
        self.parent()
            .and_then(|p| p.element_children().last())
            .is_some_and(|last| std::ptr::eq(last, self.node))
    }

    pub fn is_element(&self) -> bool {
        self.node.is_element()
    }

    pub fn is_text(&self) -> bool {
        self.node.is_text()
    }

    pub fn tag_name(&self) -> &'a str {
        self.node.tag_name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.node.has_attr(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.children()
    }

    pub fn element_children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.element_children()
    }

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }

    pub fn outer_html(&self) -> String {
        self.node.outer_html()
    }
}
