//! Scrape API client.

use std::time::Duration;

use tracing::{info, warn};
use ureq::Agent;

use crate::error::ScrapeError;
use crate::types::{ScrapeData, ScrapeOptions, ScrapeRequest, ScrapeResponse};

/// Scrape endpoint of the hosted Firecrawl API.
pub const DEFAULT_ENDPOINT: &str = "https://api.firecrawl.dev/v1/scrape";

/// Default timeout for a whole scrape request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Scrape API client.
pub struct ScrapeClient {
    agent: Agent,
    endpoint: String,
    api_key: String,
}

impl ScrapeClient {
    /// Create a client for the hosted API.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::MissingApiKey`] if `api_key` is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ScrapeError> {
        let api_key = api_key.into().trim().to_owned();
        if api_key.is_empty() {
            return Err(ScrapeError::MissingApiKey);
        }

        Ok(Self {
            agent: create_agent(DEFAULT_TIMEOUT),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            api_key,
        })
    }

    /// Send requests to another endpoint (self-hosted instance, test server).
    #[must_use]
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        endpoint.clone_into(&mut self.endpoint);
        self
    }

    /// Set the HTTP timeout for the whole request.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Scrape one page and return it as Markdown.
    ///
    /// Sends a single request with no retry.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::EmptyUrl`] when `url` is blank (nothing is sent)
    /// - [`ScrapeError::HttpRequest`] on network failure
    /// - [`ScrapeError::Api`] when the service answers with a non-2xx status
    /// - [`ScrapeError::Json`] / [`ScrapeError::MissingData`] on an unexpected body
    pub fn scrape(&self, url: &str, options: &ScrapeOptions) -> Result<ScrapeData, ScrapeError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ScrapeError::EmptyUrl);
        }

        info!(url, wait_for = options.wait_for, mobile = options.mobile, "Scraping page");

        let response = self
            .agent
            .post(&self.endpoint)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send_json(ScrapeRequest::new(url, options))?;

        let status = response.status().as_u16();
        let body = response.into_body().read_to_string()?;

        let data = parse_response(status, &body)?;
        info!(url, markdown_len = data.markdown.len(), "Scraped page");
        Ok(data)
    }
}

fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Turn a status and body into the scraped page or the service's error.
pub(crate) fn parse_response(status: u16, body: &str) -> Result<ScrapeData, ScrapeError> {
    let success = (200..300).contains(&status);

    let response: ScrapeResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(err) if success => return Err(err.into()),
        Err(_) => {
            warn!(status, "Scrape failed with a non-JSON body");
            return Err(api_error(status, None));
        }
    };

    if !success {
        let message = response.error.or(response.message);
        warn!(status, message = message.as_deref(), "Scrape failed");
        return Err(api_error(status, message));
    }

    response.data.ok_or(ScrapeError::MissingData)
}

fn api_error(status: u16, message: Option<String>) -> ScrapeError {
    ScrapeError::Api {
        status,
        message: message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Error {status}: Failed to scrape URL")),
    }
}
