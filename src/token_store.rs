use crate::errors::StorageError;
use crate::models::Credentials;
use crate::utils;
use keyring::Entry;
use secrecy::{ExposeSecret, SecretString};

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

const KEYRING_SERVICE: &str = "tradepost";
const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Durable storage for the credential pair.
///
/// Tokens live under two fixed keys in the OS keyring, with a JSON file
/// in the config directory as fallback for systems without a usable
/// keyring. Presence of the access token is the only authentication
/// signal; nothing here inspects or validates token contents.
#[derive(Debug)]
pub struct TokenStore {
    access_entry: Option<Arc<Entry>>,
    refresh_entry: Option<Arc<Entry>>,
    credentials_path: PathBuf,
}

impl TokenStore {
    pub fn new() -> Result<Self, StorageError> {
        // Try to create both keyring entries; degrade to file storage together
        let (access_entry, refresh_entry) = match (
            Entry::new(KEYRING_SERVICE, ACCESS_TOKEN_KEY),
            Entry::new(KEYRING_SERVICE, REFRESH_TOKEN_KEY),
        ) {
            (Ok(access), Ok(refresh)) => (Some(Arc::new(access)), Some(Arc::new(refresh))),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(
                    "Keyring is not available on this system ({}), will use file-based storage.",
                    e
                );
                (None, None)
            }
        };

        Self::build(access_entry, refresh_entry, utils::get_credentials_path())
    }

    /// File-only store at an explicit path. Used for headless setups where
    /// no keyring exists and by tests that need deterministic storage.
    pub fn with_file(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::build(None, None, path.into())
    }

    fn build(
        access_entry: Option<Arc<Entry>>,
        refresh_entry: Option<Arc<Entry>>,
        credentials_path: PathBuf,
    ) -> Result<Self, StorageError> {
        if let Some(parent) = credentials_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(TokenStore {
            access_entry,
            refresh_entry,
            credentials_path,
        })
    }

    /// Currently stored access token, if any.
    pub fn access_token(&self) -> Result<Option<SecretString>, StorageError> {
        if let Some(ref entry) = self.access_entry {
            match read_entry(entry) {
                Ok(Some(value)) => return Ok(Some(SecretString::new(value))),
                Ok(None) => {
                    tracing::debug!("No access token in keyring, checking file storage");
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to read access token from keyring: {:?}. Checking file storage.",
                        e
                    );
                }
            }
        }

        match self.read_file()? {
            Some(credentials) => {
                self.migrate_file_to_keyring(&credentials);
                Ok(Some(credentials.access_token))
            }
            None => Ok(None),
        }
    }

    /// Currently stored refresh token, if any.
    pub fn refresh_token(&self) -> Result<Option<SecretString>, StorageError> {
        if let Some(ref entry) = self.refresh_entry {
            match read_entry(entry) {
                Ok(Some(value)) => return Ok(Some(SecretString::new(value))),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        "Failed to read refresh token from keyring: {:?}. Checking file storage.",
                        e
                    );
                }
            }
        }

        Ok(self.read_file()?.and_then(|c| c.refresh_token))
    }

    /// Persist a credential pair.
    ///
    /// The access token is always written. The refresh token is written
    /// only when one is provided; a partial update leaves any previously
    /// stored refresh token in place. Token refresh depends on this.
    pub fn set_tokens(&self, access: &str, refresh: Option<&str>) -> Result<(), StorageError> {
        if let (Some(access_entry), Some(refresh_entry)) = (&self.access_entry, &self.refresh_entry)
        {
            let result = access_entry.set_password(access).and_then(|_| match refresh {
                Some(value) => refresh_entry.set_password(value),
                None => Ok(()),
            });
            match result {
                Ok(()) => {
                    tracing::debug!("Tokens saved to keyring");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to save tokens to keyring: {:?}. Trying fallback storage.",
                        e
                    );
                }
            }
        }

        // File fallback. Read-modify-write keeps the stored refresh token
        // when the update carries none.
        let refresh_token = match refresh {
            Some(value) => Some(SecretString::new(value.to_string())),
            None => self.read_file()?.and_then(|c| c.refresh_token),
        };
        self.write_file(&Credentials {
            access_token: SecretString::new(access.to_string()),
            refresh_token,
        })
    }

    /// Remove both tokens. Absent entries are a no-op, so calling this
    /// repeatedly (or while logged out) is safe.
    pub fn clear_tokens(&self) -> Result<(), StorageError> {
        for (entry, label) in [
            (&self.access_entry, "access"),
            (&self.refresh_entry, "refresh"),
        ] {
            if let Some(entry) = entry {
                match entry.delete_password() {
                    Ok(()) => tracing::debug!("{} token deleted from keyring", label),
                    Err(keyring::Error::NoEntry) => {
                        tracing::debug!("No {} token entry found in keyring to delete", label)
                    }
                    Err(e) => {
                        tracing::warn!("Failed to delete {} token from keyring: {:?}", label, e)
                    }
                }
            }
        }

        if self.credentials_path.exists() {
            fs::remove_file(&self.credentials_path)?;
            tracing::debug!("Credential file deleted: {:?}", self.credentials_path);
        }

        Ok(())
    }

    /// True iff an access token is stored. No expiry or format checks.
    pub fn is_authenticated(&self) -> bool {
        match self.access_token() {
            Ok(token) => token.is_some(),
            Err(e) => {
                tracing::warn!("Failed to read access token: {}", e);
                false
            }
        }
    }

    // Best-effort migration of file credentials into a newly usable keyring
    fn migrate_file_to_keyring(&self, credentials: &Credentials) {
        let (Some(access_entry), Some(refresh_entry)) = (&self.access_entry, &self.refresh_entry)
        else {
            return;
        };

        if let Err(e) = access_entry.set_password(credentials.access_token.expose_secret()) {
            tracing::warn!("Failed to migrate access token to keyring: {:?}", e);
            return;
        }
        if let Some(ref refresh) = credentials.refresh_token {
            if let Err(e) = refresh_entry.set_password(refresh.expose_secret()) {
                tracing::warn!("Failed to migrate refresh token to keyring: {:?}", e);
                return;
            }
        }
        if let Err(e) = fs::remove_file(&self.credentials_path) {
            tracing::warn!("Failed to remove migrated credential file: {}", e);
        } else {
            tracing::info!("Credentials migrated from file to keyring");
        }
    }

    fn read_file(&self) -> Result<Option<Credentials>, StorageError> {
        if !self.credentials_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.credentials_path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }

        let credentials: Credentials =
            serde_json::from_str(&contents).map_err(|source| StorageError::Parse { source })?;
        Ok(Some(credentials))
    }

    fn write_file(&self, credentials: &Credentials) -> Result<(), StorageError> {
        let contents =
            serde_json::to_string(credentials).map_err(|source| StorageError::Parse { source })?;
        fs::write(&self.credentials_path, contents)?;
        tracing::debug!("Credentials saved to file: {:?}", self.credentials_path);
        Ok(())
    }
}

fn read_entry(entry: &Entry) -> Result<Option<String>, StorageError> {
    match entry.get_password() {
        Ok(value) if !value.is_empty() => Ok(Some(value)),
        Ok(_) => Ok(None),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(source) => Err(StorageError::Keyring { source }),
    }
}
