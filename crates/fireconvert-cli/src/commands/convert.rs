//! `fireconvert convert` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use fireconvert::{CodeBlockStyle, HeadingStyle, TurndownOptions, TurndownService};
use tracing::info;

use super::destination::Destination;
use crate::error::CliError;
use crate::output::Output;

/// Heading style flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum HeadingStyleArg {
    Atx,
    Setext,
}

/// Code block style flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum CodeBlockStyleArg {
    Fenced,
    Indented,
}

/// Arguments for the convert command.
#[derive(Args, Debug)]
pub(crate) struct ConvertArgs {
    /// HTML file to convert (reads stdin when omitted or `-`).
    input: Option<PathBuf>,

    /// Heading style.
    #[arg(long, value_enum, default_value_t = HeadingStyleArg::Atx)]
    heading_style: HeadingStyleArg,

    /// Code block style.
    #[arg(long, value_enum, default_value_t = CodeBlockStyleArg::Fenced)]
    code_block_style: CodeBlockStyleArg,

    /// Horizontal rule.
    #[arg(long, default_value = "---")]
    hr: String,

    /// Bullet list marker: `-`, `*` or `+`.
    #[arg(long, default_value_t = '-', value_parser = parse_bullet)]
    bullet: char,

    /// Fence for fenced code blocks: three or more backticks or tildes.
    #[arg(long, default_value = "```", value_parser = parse_fence)]
    fence: String,

    /// Emphasis delimiter: `*` or `_`.
    #[arg(long, default_value_t = '*', value_parser = parse_em_delimiter)]
    em_delimiter: char,

    /// Strong delimiter: `**` or `__`.
    #[arg(long, default_value = "**", value_parser = parse_strong_delimiter)]
    strong_delimiter: String,

    /// Also drop elements with this tag (repeatable; script, style and noscript are always dropped).
    #[arg(long = "exclude", value_name = "TAG")]
    exclude: Vec<String>,

    #[command(flatten)]
    destination: Destination,
}

impl From<&ConvertArgs> for TurndownOptions {
    fn from(args: &ConvertArgs) -> Self {
        Self {
            heading_style: match args.heading_style {
                HeadingStyleArg::Atx => HeadingStyle::Atx,
                HeadingStyleArg::Setext => HeadingStyle::Setext,
            },
            code_block_style: match args.code_block_style {
                CodeBlockStyleArg::Fenced => CodeBlockStyle::Fenced,
                CodeBlockStyleArg::Indented => CodeBlockStyle::Indented,
            },
            hr: args.hr.clone(),
            bullet_list_marker: args.bullet,
            fence: args.fence.clone(),
            em_delimiter: args.em_delimiter,
            strong_delimiter: args.strong_delimiter.clone(),
            ..Self::default()
        }
    }
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read, is empty or is not UTF-8.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let html = read_input(self.input.as_deref())?;
        if html.iter().all(u8::is_ascii_whitespace) {
            return Err(CliError::Validation("no HTML to convert".to_owned()));
        }

        let service = self.service();
        let markdown = service.turndown_bytes(&html)?;
        info!(html_len = html.len(), markdown_len = markdown.len(), "Converted HTML");

        if markdown.is_empty() {
            output.warning("Conversion produced no Markdown");
        }
        self.destination.deliver(&markdown, &output)
    }

    fn service(&self) -> TurndownService {
        let mut service = TurndownService::with_options(self.into());
        for tag in &self.exclude {
            service.exclude(tag);
        }
        service
    }
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read(path)?),
        _ => {
            let mut buffer = Vec::new();
            std::io::stdin().lock().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn parse_bullet(s: &str) -> Result<char, String> {
    match s {
        "-" | "*" | "+" => Ok(s.chars().next().unwrap_or('-')),
        _ => Err("bullet must be one of -, * or +".to_string()),
    }
}

fn parse_em_delimiter(s: &str) -> Result<char, String> {
    match s {
        "*" | "_" => Ok(s.chars().next().unwrap_or('*')),
        _ => Err("emphasis delimiter must be * or _".to_string()),
    }
}

fn parse_strong_delimiter(s: &str) -> Result<String, String> {
    match s {
        "**" | "__" => Ok(s.to_string()),
        _ => Err("strong delimiter must be ** or __".to_string()),
    }
}

fn parse_fence(s: &str) -> Result<String, String> {
    let valid = s.len() >= 3
        && (s.chars().all(|c| c == '`') || s.chars().all(|c| c == '~'));
    if valid {
        Ok(s.to_string())
    } else {
        Err("fence must be three or more backticks or tildes".to_string())
    }
}
