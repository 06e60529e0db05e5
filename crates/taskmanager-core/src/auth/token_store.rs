use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Keyring service name
const SERVICE_NAME: &str = "taskmanager";

/// Fixed key the bearer token is stored under
pub const TOKEN_KEY: &str = "token";

/// Token file name in the data directory
const TOKEN_FILE: &str = "token.json";

/// Durable home of the single bearer token.
///
/// The token is opaque: no expiry tracking, no refresh. It stays valid until
/// the server rejects it and someone calls [`clear`](TokenStore::clear).
pub trait TokenStore: Send + Sync {
    fn save(&self, token: &str) -> Result<()>;

    fn read(&self) -> Result<Option<String>>;

    /// Remove the token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// Token kept in the OS keychain.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a different keychain service, e.g. to separate environments
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, TOKEN_KEY).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn save(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn read(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    saved_at: DateTime<Utc>,
}

/// Token kept in a JSON file, for platforms without a usable keychain.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}

impl TokenStore for FileTokenStore {
    fn save(&self, token: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create token directory")?;
        let stored = StoredToken {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(self.token_path(), contents).context("Failed to write token file")?;
        Ok(())
    }

    fn read(&self) -> Result<Option<String>> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read token file")?;
        let stored: StoredToken =
            serde_json::from_str(&contents).context("Failed to parse token file")?;
        debug!(saved_at = %stored.saved_at, "Loaded token from file");
        Ok(Some(stored.token))
    }

    fn clear(&self) -> Result<()> {
        let path = self.token_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove token file")?;
        }
        Ok(())
    }
}

/// Process-local token, gone when the process exits.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token already stored, as if from a previous session
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.token
            .lock()
            .map_err(|_| anyhow::anyhow!("Token store lock poisoned"))
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, token: &str) -> Result<()> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn read(&self) -> Result<Option<String>> {
        Ok(self.slot()?.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}
