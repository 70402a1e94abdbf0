//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod destination;
pub(crate) mod key;
pub(crate) mod scrape;

pub(crate) use convert::ConvertArgs;
pub(crate) use key::KeyCommand;
pub(crate) use scrape::ScrapeArgs;
