//! Rule and Filter types for HTML conversion.

use crate::node::NodeRef;
use crate::service::TurndownOptions;

/// Type alias for replacement functions
pub type ReplacementFn = Box<dyn Fn(&NodeRef, &str, &TurndownOptions) -> String + Send + Sync>;

/// Type alias for filter predicates
pub type PredicateFn = Box<dyn Fn(&str, &NodeRef, &TurndownOptions) -> bool + Send + Sync>;

/// A filter determines which elements a rule applies to
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match using a predicate over (tag, node, options)
    Predicate(PredicateFn),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &NodeRef, &TurndownOptions) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Check if this filter matches an element
    pub fn matches(&self, node: &NodeRef, options: &TurndownOptions) -> bool {
        if !node.is_element() {
            return false;
        }
        let tag = node.tag_name();
        match self {
            Filter::TagName(t) => tag == t,
            Filter::TagNames(tags) => tags.iter().any(|t| t == tag),
            Filter::Predicate(f) => f(tag, node, options),
        }
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::TagName(t) => f.debug_tuple("TagName").field(t).finish(),
            Filter::TagNames(tags) => f.debug_tuple("TagNames").field(tags).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A rule defines how to convert a matched HTML element to Markdown
pub struct Rule {
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    /// Replacement function, called with the element's rendered children
    pub replacement: ReplacementFn,
}

impl Rule {
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &TurndownOptions) -> String + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &TurndownOptions) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &TurndownOptions) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Apply this rule's replacement
    pub fn replace(&self, node: &NodeRef, content: &str, options: &TurndownOptions) -> String {
        (self.replacement)(node, content, options)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("filter", &self.filter).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn test_tag_filters() {
        let options = TurndownOptions::default();
        let h2 = Node::element("h2");
        let node = NodeRef::new(&h2);

        assert!(Filter::tag("H2").matches(&node, &options));
        assert!(Filter::tags(&["h1", "h2"]).matches(&node, &options));
        assert!(!Filter::tag("h3").matches(&node, &options));
    }

    #[test]
    fn test_predicate_filter_sees_attributes() {
        let options = TurndownOptions::default();
        let filter = Filter::predicate(|tag, node, _| tag == "div" && node.has_attr("data-note"));

        let plain = Node::element("div");
        let note = Node::element_with_attrs("div", [("data-note", "")]);
        assert!(!filter.matches(&NodeRef::new(&plain), &options));
        assert!(filter.matches(&NodeRef::new(&note), &options));
    }

    #[test]
    fn test_filters_ignore_text_nodes() {
        let options = TurndownOptions::default();
        let text = Node::text("p");
        assert!(!Filter::predicate(|_, _, _| true).matches(&NodeRef::new(&text), &options));
    }

    #[test]
    fn test_rule_replace() {
        let options = TurndownOptions::default();
        let rule = Rule::for_tags(&["sup", "sub"], |node, content, _| {
            format!("<{}>{}</{}>", node.tag_name(), content, node.tag_name())
        });
        let sup = Node::element("sup");
        let node = NodeRef::new(&sup);

        assert!(rule.filter.matches(&node, &options));
        assert_eq!(rule.replace(&node, "2", &options), "<sup>2</sup>");
    }
}
