//! HTML parsing front-end.
//!
//! Parsing is delegated to scraper (html5ever underneath), which applies the
//! browser error-recovery rules: unclosed tags are closed, misnested tags are
//! repaired and `html`/`head`/`body` are inserted when missing. The result is
//! copied into the crate's own [`Node`] tree, keeping only `<body>`.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;

/// Parse an HTML string into a document whose only child is `<body>`.
///
/// Parsing never fails. Empty input gives an empty body and plain text ends up
/// as a single text node inside it.
///
/// # Example
///
/// ```rust
/// use fireconvert::{parse_html, TurndownService};
///
/// let document = parse_html("<h1>Hello <em>World</em>");
/// assert_eq!(document.children[0].tag_name(), "body");
///
/// let service = TurndownService::new();
/// let markdown = service.turndown_node(&document).unwrap();
/// assert_eq!(markdown, "# Hello *World*");
/// ```
pub fn parse_html(html: &str) -> Node {
    let parsed = Html::parse_document(html);
    let mut document = Node::document();

    let body = parsed
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body");

    if let Some(body) = body {
        document.add_child(scraper_to_node(body));
    }

    document
}

/// Convert a scraper ElementRef to our Node structure
fn scraper_to_node(element: ElementRef) -> Node {
    let mut node = Node::element_with_attrs(element.value().name(), element.value().attrs());

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => node.add_child(Node::text(&text.text)),
            ScraperNode::Comment(comment) => node.add_child(Node::comment(&comment.comment)),
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(scraper_to_node(child_element));
                }
            }
            _ => {}
        }
    }

    node
}
