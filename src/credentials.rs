//! Password storage in a single flat file.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::flatfile;

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    default_password: String,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, default_password: impl Into<String>) -> Self {
        CredentialStore {
            path: path.into(),
            default_password: default_password.into(),
        }
    }

    pub fn default_password(&self) -> &str {
        &self.default_password
    }

    /// Current password: the trimmed file contents, or the default when the
    /// file is absent. An unreadable file counts as absent.
    pub fn load_password(&self) -> String {
        match flatfile::read_optional(&self.path) {
            Ok(Some(contents)) => contents.trim().to_string(),
            Ok(None) => {
                debug!(path = %self.path.display(), "no password file, using default");
                self.default_password.clone()
            }
            Err(err) => {
                warn!(?err, path = %self.path.display(), "password file unreadable, using default");
                self.default_password.clone()
            }
        }
    }

    /// Overwrite the stored password. The value is written verbatim.
    pub fn save_password(&self, new: &str) -> Result<()> {
        flatfile::replace(&self.path, new)?;
        info!(path = %self.path.display(), "password updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("password.txt"), "admin123")
    }

    #[test]
    fn test_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load_password(), "admin123");
    }

    #[test]
    fn test_load_trims_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("password.txt"), "  hunter2 \n").unwrap();
        assert_eq!(store.load_password(), "hunter2");
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_password("s3cret").unwrap();
        assert_eq!(store.load_password(), "s3cret");
    }

    #[test]
    fn test_save_does_not_trim() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_password("pass word \n").unwrap();

        let on_disk = fs::read_to_string(dir.path().join("password.txt")).unwrap();
        assert_eq!(on_disk, "pass word \n");
        assert_eq!(store.load_password(), "pass word");
    }

    #[test]
    fn test_empty_file_is_empty_password() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("password.txt"), "").unwrap();
        assert_eq!(store.load_password(), "");
    }

    #[test]
    fn test_save_into_missing_dir_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nope").join("password.txt"), "admin123");
        assert!(store.save_password("abcd").is_err());
        assert_eq!(store.load_password(), "admin123");
    }
}
