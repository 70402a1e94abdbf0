//! # fireconvert
//!
//! Convert HTML documents to clean Markdown.
//!
//! This is a Rust implementation in the spirit of [turndown](https://github.com/mixmark-io/turndown):
//! HTML is parsed with a browser-grade parser, presentation-only elements are
//! pruned, and the remaining tree is rendered bottom-up through a table of rules.
//!
//! ## Pipeline
//!
//! ```text
//! HTML string ──parse──▶ Node tree ──prune + collapse──▶ working copy ──rules──▶ Markdown
//! ```
//!
//! - **Parsing** never fails for string input; malformed markup is repaired the
//!   way browsers repair it. Only the `<body>` subtree is rendered.
//! - **Pruning** drops `script`, `style` and `noscript` subtrees (plus anything
//!   added with [`TurndownService::exclude`]) before a single rule runs.
//! - **Rendering** hands every rule its children's finished Markdown, so rules
//!   compose strings rather than walk nodes.
//!
//! ## Example
//!
//! ```rust
//! use fireconvert::TurndownService;
//!
//! let service = TurndownService::new();
//! let markdown = service.turndown("<h1>Hello <em>World</em></h1>").unwrap();
//! assert_eq!(markdown, "# Hello *World*");
//! ```
//!
//! ## Custom rules
//!
//! ```rust
//! use fireconvert::{Rule, TurndownService};
//!
//! let mut service = TurndownService::new();
//! service.add_rule("mark", Rule::for_tag("mark", |_, content, _| format!("=={content}==")));
//!
//! let markdown = service.turndown("<p>a <mark>hit</mark></p>").unwrap();
//! assert_eq!(markdown, "a ==hit==");
//! ```

pub mod html;
pub mod node;
mod prepare;
mod rules;
mod service;
mod utilities;

pub use html::parse_html;
pub use node::{Node, NodeRef, NodeType};
pub use rules::{Filter, Rule, Rules};
pub use service::{CodeBlockStyle, HeadingStyle, TurndownOptions, TurndownService};
pub use utilities::{escape_markdown, is_block, is_void};

/// Error type for conversion operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The input could not be read as text, so no document tree exists.
    #[error("failed to convert HTML to Markdown: input is not valid UTF-8")]
    Parse(#[from] std::str::Utf8Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
