//! FireConvert CLI - web pages and HTML to Markdown.
//!
//! Provides commands for:
//! - `convert`: Convert an HTML file (or stdin) to Markdown locally
//! - `scrape`: Fetch a page through the Firecrawl API as Markdown
//! - `key set|show|clear`: Manage the stored API key

mod commands;
mod credentials;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, KeyCommand, ScrapeArgs};
use output::Output;

/// FireConvert - turn web pages and HTML into Markdown.
#[derive(Parser)]
#[command(name = "fireconvert", version, about)]
struct Cli {
    /// Log progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert HTML to Markdown locally.
    Convert(ConvertArgs),
    /// Scrape a URL through the Firecrawl API.
    Scrape(ScrapeArgs),
    /// Manage the stored Firecrawl API key.
    #[command(subcommand)]
    Key(KeyCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::Scrape(args) => args.execute(),
        Commands::Key(cmd) => cmd.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}
