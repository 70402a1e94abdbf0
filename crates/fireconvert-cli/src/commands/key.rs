//! `fireconvert key` commands.

use clap::Subcommand;

use crate::credentials::{mask_key, CredentialStore};
use crate::error::CliError;
use crate::output::Output;

/// Manage the stored Firecrawl API key.
#[derive(Subcommand, Debug)]
pub(crate) enum KeyCommand {
    /// Store the API key used by `scrape`.
    Set {
        /// Firecrawl API key.
        key: String,
    },
    /// Show the stored API key, masked.
    Show,
    /// Remove the stored API key.
    Clear,
}

impl KeyCommand {
    /// Execute the key command.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials file cannot be read or written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let store = CredentialStore::default_location()?;
        self.run(&store, &Output::new())
    }

    fn run(self, store: &CredentialStore, output: &Output) -> Result<(), CliError> {
        match self {
            Self::Set { key } => {
                store.save(&key)?;
                output.success(&format!("Saved API key to {}", store.path().display()));
            }
            Self::Show => match store.load()? {
                Some(key) => output.info(&mask_key(&key)),
                None => output.warning("No API key stored"),
            },
            Self::Clear => {
                if store.clear()? {
                    output.success("Removed stored API key");
                } else {
                    output.warning("No API key stored");
                }
            }
        }
        Ok(())
    }
}
