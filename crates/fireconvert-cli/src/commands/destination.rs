//! Where converted Markdown goes: stdout, a named file, or a download file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Output flags shared by `convert` and `scrape`.
#[derive(Args, Debug, Default)]
pub(crate) struct Destination {
    /// Write the Markdown to this file instead of stdout.
    #[arg(short, long, value_name = "PATH", conflicts_with = "download")]
    output: Option<PathBuf>,

    /// Write the Markdown to `converted-<timestamp>.md` in the current directory.
    #[arg(long)]
    download: bool,
}

impl Destination {
    /// Deliver the Markdown, reporting any written file on stderr.
    pub(crate) fn deliver(&self, markdown: &str, output: &Output) -> Result<(), CliError> {
        if let Some(path) = self.target() {
            write_file(&path, markdown)?;
            output.success(&format!("Wrote {}", path.display()));
            return Ok(());
        }

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{markdown}")?;
        stdout.flush()?;
        Ok(())
    }

    fn target(&self) -> Option<PathBuf> {
        if let Some(path) = &self.output {
            return Some(path.clone());
        }
        self.download
            .then(|| PathBuf::from(download_filename(unix_millis())))
    }
}

fn write_file(path: &Path, markdown: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, markdown)?;
    Ok(())
}

/// File name used by `--download`.
pub(crate) fn download_filename(millis: u128) -> String {
    format!("converted-{millis}.md")
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
