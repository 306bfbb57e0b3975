// Credential caching and publishing to the AWS CLI files
mod cache;

pub use cache::CredentialCache;

use crate::aws_config::AwsFiles;
use crate::config::AppPaths;
use crate::error::Result;
use crate::models::CloudCredentials;

/// Where assumed-role credentials end up after a login
pub struct CredentialManager {
    cache: CredentialCache,
    aws_files: AwsFiles,
}

impl CredentialManager {
    pub fn new(paths: &AppPaths) -> Result<Self> {
        Ok(Self {
            cache: CredentialCache::new(&paths.cache_dir)?,
            aws_files: AwsFiles::new(&paths.aws_dir),
        })
    }

    /// Unexpired credentials from an earlier login of `profile`
    pub fn cached(&self, profile: &str) -> Result<Option<CloudCredentials>> {
        self.cache.get_credentials(profile)
    }

    /// Write the credentials file (and region, when given), then remember the credentials
    pub fn store(
        &self,
        profile: &str,
        creds: &CloudCredentials,
        region: Option<&str>,
    ) -> Result<()> {
        self.aws_files.write_credentials(profile, creds)?;
        if let Some(region) = region {
            self.aws_files.write_region(profile, region)?;
        }

        self.cache.save_credentials(profile, creds)
    }
}
