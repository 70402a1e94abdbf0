//! Stored Firecrawl API key.
//!
//! The key lives in `<config dir>/fireconvert/credentials.json` as a JSON
//! object. Other entries in the file are left alone.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::CliError;

/// Name the API key is stored under.
pub(crate) const API_KEY_NAME: &str = "firecrawl_api_key";

/// JSON file holding the API key.
pub(crate) struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the user's config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no config directory.
    pub(crate) fn default_location() -> Result<Self, CliError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            CliError::Validation("could not determine config directory".to_owned())
        })?;
        Ok(Self::new(
            config_dir.join("fireconvert").join("credentials.json"),
        ))
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Stored key, or `None` when nothing (or only a blank key) is stored.
    pub(crate) fn load(&self) -> Result<Option<String>, CliError> {
        let entries = self.read()?;
        Ok(entries
            .get(API_KEY_NAME)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_owned))
    }

    pub(crate) fn save(&self, key: &str) -> Result<(), CliError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::Validation("API key must not be empty".to_owned()));
        }

        let mut entries = self.read()?;
        entries.insert(API_KEY_NAME.to_owned(), Value::String(key.to_owned()));
        self.write(&entries)
    }

    /// Remove the key. Returns whether one was stored.
    pub(crate) fn clear(&self) -> Result<bool, CliError> {
        let mut entries = self.read()?;
        if entries.remove(API_KEY_NAME).is_none() {
            return Ok(false);
        }
        self.write(&entries)?;
        Ok(true)
    }

    fn read(&self) -> Result<Map<String, Value>, CliError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = create_private(&self.path)?;
        file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "Wrote credentials");
        Ok(())
    }
}

/// Open for writing, truncated. On unix a new file is created as 0600.
fn create_private(path: &Path) -> Result<File, CliError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    Ok(options.open(path)?)
}

/// Tighten a file that existed before with looser permissions
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), CliError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), CliError> {
    Ok(())
}

/// Key with everything but its ends hidden.
pub(crate) fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("fireconvert").join("credentials.json"))
    }

    #[test]
    fn test_load_without_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).load().unwrap(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.save("  fc-123456789  ").unwrap();
        assert_eq!(store.load().unwrap(), Some("fc-123456789".to_owned()));

        let content = fs::read_to_string(store.path()).unwrap();
        let json: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["firecrawl_api_key"], "fc-123456789");
    }

    #[test]
    fn test_save_replaces_and_keeps_other_entries() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"other": 1, "firecrawl_api_key": "old"}"#).unwrap();

        store.save("new").unwrap();

        let json: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(json["other"], 1);
        assert_eq!(json["firecrawl_api_key"], "new");
    }

    #[test]
    fn test_save_rejects_blank_key() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir).save("   ").unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(!store.clear().unwrap());
        store.save("fc-key").unwrap();
        assert!(store.clear().unwrap());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(store.load(), Err(CliError::Json(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save("fc-key").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_loose_file_is_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{}").unwrap();
        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();

        store.save("fc-key").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_created_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.json");
        drop(create_private(&path).unwrap());

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("fc-1234567890abcdef"), "fc-...cdef");
        assert_eq!(mask_key("short"), "*****");
    }
}
