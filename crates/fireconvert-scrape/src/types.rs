//! Request and response bodies of the scrape endpoint.

use serde::{Deserialize, Serialize};

/// Per-request scrape settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeOptions {
    /// Milliseconds the service waits for the page before capturing it.
    pub wait_for: u64,
    /// Render the page with a mobile viewport.
    pub mobile: bool,
}

/// JSON body posted to the endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest<'a> {
    pub url: &'a str,
    pub formats: [&'static str; 1],
    pub wait_for: u64,
    pub mobile: bool,
}

impl<'a> ScrapeRequest<'a> {
    pub fn new(url: &'a str, options: &ScrapeOptions) -> Self {
        Self {
            url,
            formats: ["markdown"],
            wait_for: options.wait_for,
            mobile: options.mobile,
        }
    }
}

/// Scraped page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScrapeData {
    /// Page content as Markdown.
    #[serde(default)]
    pub markdown: String,
    /// Page metadata (title, source URL, status code, ...), passed through untouched.
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Envelope of every response, successful or not.
#[derive(Debug, Deserialize)]
pub(crate) struct ScrapeResponse {
    #[serde(default)]
    pub data: Option<ScrapeData>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
