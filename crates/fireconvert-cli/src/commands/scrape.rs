//! `fireconvert scrape` command implementation.

use std::time::Duration;

use clap::Args;
use fireconvert_scrape::{ScrapeClient, ScrapeOptions, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};

use super::destination::Destination;
use crate::credentials::CredentialStore;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the scrape command.
#[derive(Args, Debug)]
pub(crate) struct ScrapeArgs {
    /// URL of the page to scrape.
    url: String,

    /// Milliseconds to wait for the page before capturing it.
    #[arg(long, value_name = "MS", default_value_t = 0)]
    wait_for: u64,

    /// Render the page with a mobile viewport.
    #[arg(long)]
    mobile: bool,

    /// Firecrawl API key (defaults to the stored key).
    #[arg(long, env = "FIRECRAWL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Scrape endpoint (self-hosted Firecrawl).
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    #[command(flatten)]
    destination: Destination,
}

impl ScrapeArgs {
    /// Execute the scrape command.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is available or the scrape fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        if self.url.trim().is_empty() {
            return Err(CliError::Validation("no URL given".to_owned()));
        }

        let api_key = resolve_api_key(self.api_key.as_deref(), || {
            CredentialStore::default_location()?.load()
        })?;

        let client = ScrapeClient::new(api_key)?
            .endpoint(&self.endpoint)
            .timeout(Duration::from_secs(self.timeout));

        output.info(&format!("Scraping {}...", self.url));
        let page = client.scrape(&self.url, &self.options())?;

        if page.markdown.trim().is_empty() {
            output.warning("The page produced no Markdown");
        }
        self.destination.deliver(&page.markdown, &output)
    }

    fn options(&self) -> ScrapeOptions {
        ScrapeOptions {
            wait_for: self.wait_for,
            mobile: self.mobile,
        }
    }
}

/// Key from the flag or environment, else the stored one.
fn resolve_api_key<F>(explicit: Option<&str>, stored: F) -> Result<String, CliError>
where
    F: FnOnce() -> Result<Option<String>, CliError>,
{
    if let Some(key) = explicit.map(str::trim).filter(|key| !key.is_empty()) {
        return Ok(key.to_owned());
    }

    stored()?.ok_or_else(|| {
        CliError::Validation(
            "no Firecrawl API key: pass --api-key, set FIRECRAWL_API_KEY or run `fireconvert key set <KEY>`"
                .to_owned(),
        )
    })
}
