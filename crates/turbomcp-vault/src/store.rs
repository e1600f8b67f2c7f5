//! A file-backed, encrypted map of provider name to secret or structured
//! config, persisted as whole-file-replacement JSON.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use turbomcp_core::Result;

use crate::cipher;
use crate::schema;

/// One provider's secret material: either a bare string secret (an API
/// key) or a structured JSON config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ProviderEntry {
    Secret(String),
    Structured(Value),
}

/// A file-backed store of provider secrets, encrypted at rest with
/// AES-256-GCM.
///
/// Reads tolerate a missing file (treated as empty). Writes replace the
/// whole file, re-encrypting under a fresh IV.
pub struct EncryptedConfigStore {
    path: PathBuf,
    passphrase: String,
    entries: RwLock<HashMap<String, ProviderEntry>>,
}

impl EncryptedConfigStore {
    /// Open (but do not yet load) a store backed by `path`, encrypted
    /// under `passphrase`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            passphrase: passphrase.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Load and decrypt the store from disk, tolerating a missing file.
    ///
    /// # Errors
    ///
    /// Propagates [`turbomcp_core::Error::invalid_encrypted_format`] or
    /// [`turbomcp_core::Error::decryption_failed`] from a corrupt file, or
    /// an I/O error reading it.
    pub fn load(&self) -> Result<()> {
        let Some(encoded) = read_if_present(&self.path)? else {
            return Ok(());
        };
        if encoded.trim().is_empty() {
            return Ok(());
        }

        let plaintext = cipher::decrypt(&self.passphrase, encoded.trim())?;
        let parsed: HashMap<String, ProviderEntry> = serde_json::from_slice(&plaintext)?;
        *self.entries.write() = parsed;
        Ok(())
    }

    /// Persist the current in-memory entries, re-encrypted under a fresh
    /// IV.
    ///
    /// # Errors
    ///
    /// Propagates serialization or I/O errors.
    pub fn save(&self) -> Result<()> {
        let entries = self.entries.read();
        let plaintext = serde_json::to_vec(&*entries)?;
        drop(entries);

        let encoded = cipher::encrypt(&self.passphrase, &plaintext);
        write_atomic(&self.path, encoded.as_bytes())?;
        Ok(())
    }

    /// Set a bare-string secret for `provider`.
    pub fn set_secret(&self, provider: impl Into<String>, secret: impl Into<String>) {
        self.entries
            .write()
            .insert(provider.into(), ProviderEntry::Secret(secret.into()));
    }

    /// Set a structured config for `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`turbomcp_core::Error::validation`] if `provider` requires
    /// schema fields (e.g. `url`) that `config` is missing.
    pub fn set_structured(&self, provider: impl Into<String>, config: Value) -> Result<()> {
        let provider = provider.into();
        schema::validate_structured_entry(&provider, &config)?;
        self.entries
            .write()
            .insert(provider, ProviderEntry::Structured(config));
        Ok(())
    }

    /// Look up an entry by provider name.
    #[must_use]
    pub fn get(&self, provider: &str) -> Option<ProviderEntry> {
        self.entries.read().get(provider).cloned()
    }

    /// Remove an entry by provider name, returning whether it existed.
    pub fn remove(&self, provider: &str) -> bool {
        self.entries.write().remove(provider).is_some()
    }

    /// All provider names currently held.
    #[must_use]
    pub fn providers(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

fn read_if_present(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_at(dir: &tempfile::TempDir) -> EncryptedConfigStore {
        EncryptedConfigStore::new(dir.path().join("llms.encrypted.json"), "test-passphrase")
    }

    #[test]
    fn loading_a_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        store.load().unwrap();
        assert!(store.providers().is_empty());
    }

    #[test]
    fn set_save_reload_round_trips_a_secret() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        store.set_secret("anthropic", "sk-test-key");
        store.save().unwrap();

        let reloaded = store_at(&dir);
        reloaded.load().unwrap();
        assert_eq!(
            reloaded.get("anthropic"),
            Some(ProviderEntry::Secret("sk-test-key".to_string()))
        );
    }

    #[test]
    fn structured_entry_without_url_is_rejected_for_url_bearing_provider() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        let err = store
            .set_structured("ollama", json!({"model": "llama3"}))
            .unwrap_err();
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn structured_entry_with_url_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        store
            .set_structured("ollama", json!({"url": "http://localhost:11434"}))
            .unwrap();
        store.save().unwrap();

        let reloaded = store_at(&dir);
        reloaded.load().unwrap();
        assert_eq!(
            reloaded.get("ollama"),
            Some(ProviderEntry::Structured(json!({"url": "http://localhost:11434"})))
        );
    }

    #[test]
    fn remove_drops_an_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        store.set_secret("anthropic", "sk-test-key");
        assert!(store.remove("anthropic"));
        assert!(store.get("anthropic").is_none());
        assert!(!store.remove("anthropic"));
    }

    #[test]
    fn wrong_passphrase_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir);
        store.set_secret("anthropic", "sk-test-key");
        store.save().unwrap();

        let wrong = EncryptedConfigStore::new(dir.path().join("llms.encrypted.json"), "wrong-pass");
        let err = wrong.load().unwrap_err();
        assert!(err.to_string().contains("Decryption failed"));
    }
}
