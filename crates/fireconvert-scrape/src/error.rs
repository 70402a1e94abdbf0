//! Error types for the scrape client.

/// Error from a scrape request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ScrapeError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// The service answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by the service, or a generic one.
        message: String,
    },

    /// Response body was not the expected JSON.
    #[error("invalid scrape response: {0}")]
    Json(#[from] serde_json::Error),

    /// Success status but no `data` object in the body.
    #[error("scrape response contained no data")]
    MissingData,

    /// No URL to scrape.
    #[error("no URL given")]
    EmptyUrl,

    /// No API key to authenticate with.
    #[error("no API key configured")]
    MissingApiKey,
}
