//! Rule system for HTML to Markdown conversion.

mod commonmark;
mod rule;

pub use commonmark::commonmark_rules;
pub use rule::{Filter, PredicateFn, ReplacementFn, Rule};

use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use crate::node::NodeRef;
use crate::service::TurndownOptions;

/// Tags pruned from every document unless the caller builds their own `Rules`
pub const DEFAULT_EXCLUDED: &[&str] = &["script", "style", "noscript"];

/// Collection of rules for conversion.
///
/// Lookup order for an element is: custom rules in registration order, then
/// the built-in CommonMark rules, then the renderer's default. The first
/// matching custom rule wins; adding a rule under a key that already exists
/// swaps the rule in place without changing its priority.
pub struct Rules {
    /// Custom rules added by the user (checked first)
    custom_rules: IndexMap<String, Rule>,
    /// Keep rules (preserve as HTML)
    keep_rules: Vec<Filter>,
    /// Remove rules (prune with the whole subtree)
    remove_rules: Vec<Filter>,
    /// Tag names pruned with their whole subtree
    excluded: IndexSet<String>,
    /// Built-in CommonMark rules
    commonmark_rules: Vec<Rule>,
}

impl Rules {
    /// Create a new Rules instance with CommonMark rules and the default removal set
    pub fn new() -> Self {
        Self {
            custom_rules: IndexMap::new(),
            keep_rules: Vec::new(),
            remove_rules: Vec::new(),
            excluded: DEFAULT_EXCLUDED.iter().map(|t| t.to_string()).collect(),
            commonmark_rules: commonmark_rules(),
        }
    }

    /// Add a custom rule
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    /// Add a keep filter
    pub fn keep(&mut self, filter: Filter) {
        self.keep_rules.push(filter);
    }

    /// Add a remove filter
    pub fn remove(&mut self, filter: Filter) {
        self.remove_rules.push(filter);
    }

    /// Add a tag to the removal set
    pub fn exclude(&mut self, tag: &str) {
        self.excluded.insert(tag.trim().to_lowercase());
    }

    /// Tags currently in the removal set
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded.iter().map(String::as_str)
    }

    /// Find the rule for a node: custom rules first, then CommonMark
    pub fn for_node<'a>(&'a self, node: &NodeRef, options: &TurndownOptions) -> Option<&'a Rule> {
        if let Some((key, rule)) = self
            .custom_rules
            .iter()
            .find(|(_, rule)| rule.filter.matches(node, options))
        {
            trace!(rule = %key, tag = node.tag_name(), "custom rule matched");
            return Some(rule);
        }

        self.commonmark_rules
            .iter()
            .find(|rule| rule.filter.matches(node, options))
    }

    /// Check if a node should be kept as HTML
    pub fn should_keep(&self, node: &NodeRef, options: &TurndownOptions) -> bool {
        self.keep_rules.iter().any(|f| f.matches(node, options))
            && self.for_node(node, options).is_none()
    }

    /// Check if a node belongs to the removal category
    pub fn should_remove(&self, node: &NodeRef, options: &TurndownOptions) -> bool {
        if !node.is_element() {
            return false;
        }
        self.excluded.contains(node.tag_name())
            || self.remove_rules.iter().any(|f| f.matches(node, options))
    }

    /// Get the keep replacement for a node
    pub fn keep_replacement(&self, node: &NodeRef) -> String {
        let html = node.outer_html();
        if crate::utilities::is_block(node.tag_name()) {
            format!("\n\n{html}\n\n")
        } else {
            html
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}
