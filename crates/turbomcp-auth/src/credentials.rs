//! JSON credential store for OAuth tokens, one file per process.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use turbomcp_core::{Error, Result};

use crate::types::{OAuthCredential, OAuthToken};

/// Safety margin subtracted from a token's expiry before treating it as
/// usable; refreshing 5 minutes early avoids racing the actual expiry.
const EXPIRY_SAFETY_MARGIN_MS: i64 = 5 * 60 * 1000;

/// Persists [`OAuthCredential`]s as a JSON array at a single file path.
///
/// Single-writer per process: callers sharing a store across tasks must
/// serialize their own writes (e.g. behind a mutex); this type does not
/// lock internally.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Open a store at an explicit path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional path: `~/.gemini-flow/mcp-oauth-tokens.json`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gemini-flow")
            .join("mcp-oauth-tokens.json")
    }

    /// Open the store at [`Self::default_path`].
    #[must_use]
    pub fn with_default_path() -> Self {
        Self::new(Self::default_path())
    }

    /// Load every stored credential. A missing file is treated as empty;
    /// any other I/O or parse error surfaces.
    pub fn load(&self) -> Result<Vec<OAuthCredential>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|e| Error::from(e).with_component("turbomcp-auth"))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Error::from(e)),
        }
    }

    /// All stored credentials.
    pub fn get_all(&self) -> Result<Vec<OAuthCredential>> {
        self.load()
    }

    /// The credential for one server, if present.
    pub fn get(&self, server_name: &str) -> Result<Option<OAuthCredential>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|c| c.server_name == server_name))
    }

    /// Insert or replace the credential for `server_name` and write the
    /// whole file back atomically with owner-only permissions.
    pub fn save(
        &self,
        server_name: &str,
        token: OAuthToken,
        client_id: Option<String>,
        token_url: Option<String>,
        mcp_server_url: Option<String>,
    ) -> Result<()> {
        let mut credentials = self.load()?;
        let updated_at_ms = now_ms();
        let entry = OAuthCredential {
            server_name: server_name.to_string(),
            token,
            client_id,
            token_url,
            mcp_server_url,
            updated_at_ms,
        };

        if let Some(existing) = credentials
            .iter_mut()
            .find(|c| c.server_name == server_name)
        {
            *existing = entry;
        } else {
            credentials.push(entry);
        }

        self.write_all(&credentials)
    }

    /// Remove the credential for `server_name`. Removes the file entirely
    /// once no credentials remain. Idempotent.
    pub fn delete(&self, server_name: &str) -> Result<()> {
        let mut credentials = self.load()?;
        credentials.retain(|c| c.server_name != server_name);

        if credentials.is_empty() {
            match std::fs::remove_file(&self.path) {
                Ok(()) | Err(_) if !self.path.exists() => Ok(()),
                Err(e) => Err(Error::from(e)),
            }
        } else {
            self.write_all(&credentials)
        }
    }

    /// Remove every stored credential.
    pub fn clear_all(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::from(e)),
        }
    }

    /// Whether `token` is expired, applying [`EXPIRY_SAFETY_MARGIN_MS`].
    #[must_use]
    pub fn is_expired(&self, token: &OAuthToken) -> bool {
        match token.expires_at_ms {
            Some(expires_at_ms) => now_ms() + EXPIRY_SAFETY_MARGIN_MS >= expires_at_ms,
            None => false,
        }
    }

    fn write_all(&self, credentials: &[OAuthCredential]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(credentials)?;
        let tmp_path = tmp_path_for(&self.path);
        std::fs::write(&tmp_path, contents)?;
        set_owner_only(&tmp_path)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o600);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> Result<()> {
    Ok(())
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_token() -> OAuthToken {
        OAuthToken {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            expires_at_ms: None,
            refresh_token: None,
            scope: None,
        }
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("tokens.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("tokens.json"));
        store
            .save("server-a", sample_token(), None, None, None)
            .unwrap();

        let credential = store.get("server-a").unwrap().unwrap();
        assert_eq!(credential.token.access_token, "tok");
    }

    #[test]
    fn save_is_idempotent_per_server() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("tokens.json"));
        store
            .save("server-a", sample_token(), None, None, None)
            .unwrap();
        let mut updated = sample_token();
        updated.access_token = "tok2".to_string();
        store
            .save("server-a", updated, None, None, None)
            .unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].token.access_token, "tok2");
    }

    #[test]
    fn delete_removes_file_when_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let store = CredentialStore::new(&path);
        store
            .save("server-a", sample_token(), None, None, None)
            .unwrap();
        store.delete("server-a").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn expiry_applies_safety_margin() {
        let store = CredentialStore::new("/dev/null");
        let mut token = sample_token();
        token.expires_at_ms = Some(now_ms() + 60_000); // 1 minute out
        assert!(store.is_expired(&token)); // inside the 5-minute margin
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let store = CredentialStore::new(&path);
        store
            .save("server-a", sample_token(), None, None, None)
            .unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
