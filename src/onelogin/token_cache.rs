use crate::config::restrict_permissions;
use crate::error::{AuthError, Result};
use crate::models::TokenValue;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk cache of the OneLogin API token, one file per API client
pub struct TokenCache {
    cache_dir: PathBuf,
}

impl TokenCache {
    pub fn new(cache_dir: &Path) -> Result<Self> {
        if !cache_dir.exists() {
            fs::create_dir_all(cache_dir)?;
        }

        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    /// The client id is a credential, so only its digest goes into the file name
    fn cache_file_path(&self, client_id: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(client_id.as_bytes());
        self.cache_dir
            .join(format!("onelogin.{:x}.cache", hasher.finalize()))
    }

    /// A missing or unreadable cache entry yields `None`; the token is simply regenerated
    pub fn get_token(&self, client_id: &str) -> Result<Option<TokenValue>> {
        let cache_file = self.cache_file_path(client_id);

        if !cache_file.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&cache_file)
            .map_err(|e| AuthError::CacheError(format!("Failed to read token cache: {}", e)))?;

        match serde_json::from_str(&contents) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable token cache {}: {}",
                    cache_file.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    pub fn save_token(&self, client_id: &str, token: &TokenValue) -> Result<()> {
        let cache_file = self.cache_file_path(client_id);
        let json = serde_json::to_string_pretty(token)?;

        fs::write(&cache_file, json)
            .map_err(|e| AuthError::CacheError(format!("Failed to write token cache: {}", e)))?;
        restrict_permissions(&cache_file)?;

        tracing::debug!("Saved OneLogin token to {}", cache_file.display());
        Ok(())
    }

    pub fn remove_token(&self, client_id: &str) -> Result<()> {
        let cache_file = self.cache_file_path(client_id);

        if cache_file.exists() {
            fs::remove_file(&cache_file)
                .map_err(|e| AuthError::CacheError(format!("Failed to remove token cache: {}", e)))?;
        }

        Ok(())
    }
}
