//! # fireconvert-scrape
//!
//! Blocking client for the [Firecrawl](https://firecrawl.dev) scrape endpoint.
//!
//! One call sends one request: there is no retry, and API errors are returned
//! with the message the service sent.
//!
//! ```no_run
//! use fireconvert_scrape::{ScrapeClient, ScrapeOptions};
//!
//! let client = ScrapeClient::new("fc-...")?;
//! let page = client.scrape("https://example.com", &ScrapeOptions::default())?;
//! println!("{}", page.markdown);
//! # Ok::<(), fireconvert_scrape::ScrapeError>(())
//! ```

mod client;
mod error;
mod types;

pub use client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, ScrapeClient};
pub use error::ScrapeError;
pub use types::{ScrapeData, ScrapeOptions, ScrapeRequest};
