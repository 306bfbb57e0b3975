use crate::config::restrict_permissions;
use crate::error::{AuthError, Result};
use crate::models::CloudCredentials;
use std::fs;
use std::path::{Path, PathBuf};

/// Last STS credentials per AWS profile, reused until they expire
pub struct CredentialCache {
    cache_dir: PathBuf,
}

impl CredentialCache {
    pub fn new(cache_dir: &Path) -> Result<Self> {
        if !cache_dir.exists() {
            fs::create_dir_all(cache_dir)?;
        }

        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    fn cache_file_path(&self, profile: &str) -> PathBuf {
        self.cache_dir.join(format!("aws.{}.cache", profile))
    }

    /// Unexpired credentials for `profile`, if any
    pub fn get_credentials(&self, profile: &str) -> Result<Option<CloudCredentials>> {
        let cache_file = self.cache_file_path(profile);

        if !cache_file.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&cache_file)
            .map_err(|e| AuthError::CacheError(format!("Failed to read cache file: {}", e)))?;

        let creds: CloudCredentials = match serde_json::from_str(&contents) {
            Ok(creds) => creds,
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable credential cache {}: {}",
                    cache_file.display(),
                    e
                );
                return Ok(None);
            }
        };

        if creds.is_expired() {
            tracing::debug!("Cached credentials for {} expired at {}", profile, creds.expiration);
            return Ok(None);
        }

        Ok(Some(creds))
    }

    pub fn save_credentials(&self, profile: &str, creds: &CloudCredentials) -> Result<()> {
        let cache_file = self.cache_file_path(profile);
        let json = serde_json::to_string_pretty(creds)?;

        fs::write(&cache_file, json)
            .map_err(|e| AuthError::CacheError(format!("Failed to write cache file: {}", e)))?;
        restrict_permissions(&cache_file)?;

        Ok(())
    }
}
