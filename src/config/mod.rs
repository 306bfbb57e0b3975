// Configuration management
use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = ".onelogin-aws-connector";
pub const DEFAULT_SERVICE: &str = "default";
pub const DEFAULT_PROFILE: &str = "default";

/// Where everything lives on disk. Built once at startup and passed down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
    pub cache_dir: PathBuf,
    pub config_file: PathBuf,
    pub aws_dir: PathBuf,
}

impl AppPaths {
    /// `root` overrides `~/.onelogin-aws-connector`; `~/.aws` always comes from the home directory
    pub fn resolve(root: Option<PathBuf>) -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            AuthError::ConfigError("Could not determine home directory".to_string())
        })?;
        let root = root.unwrap_or_else(|| home.join(APP_DIR_NAME));

        Ok(Self::with_dirs(root, home.join(".aws")))
    }

    pub fn with_dirs(root: PathBuf, aws_dir: PathBuf) -> Self {
        Self {
            cache_dir: root.join("cache"),
            config_file: root.join("config.toml"),
            root,
            aws_dir,
        }
    }

    /// Create the application and cache directories, owner-only
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.root, &self.cache_dir] {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    AuthError::ConfigError(format!(
                        "Failed to create {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
                restrict_dir_permissions(dir)?;
                tracing::debug!("Created {}", dir.display());
            }
        }
        Ok(())
    }
}

/// OneLogin API client and account settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub client_token: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub username_or_email: String,
}

/// OneLogin app and AWS role for one AWS profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub role_arn: String,
    #[serde(default)]
    pub principal_arn: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub duration_seconds: i32,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: BTreeMap<String, ServiceConfig>,
    #[serde(default)]
    pub app: BTreeMap<String, AppConfig>,
}

impl Config {
    /// A missing file is an empty config
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        tracing::debug!("Loading config from: {}", path.display());
        let contents = fs::read_to_string(path)
            .map_err(|e| AuthError::ConfigError(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;

        fs::write(path, toml_string)
            .map_err(|e| AuthError::ConfigError(format!("Failed to write config file: {}", e)))?;
        restrict_permissions(path)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Service and app settings for `profile`, checked for the fields a login needs
    pub fn login_profile(&self, profile: &str) -> Result<(&ServiceConfig, &AppConfig)> {
        let app = self.app.get(profile).ok_or_else(|| {
            AuthError::ConfigError(format!("{} profile does not exist", profile))
        })?;

        let service = self.service.get(DEFAULT_SERVICE).ok_or_else(|| {
            AuthError::ConfigError(
                "There is no initialized service. Please run `onelogin-aws init`".to_string(),
            )
        })?;

        let required = [
            ("endpoint", &service.endpoint),
            ("client_token", &service.client_token),
            ("client_secret", &service.client_secret),
            ("subdomain", &service.subdomain),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(AuthError::ConfigError(format!(
                    "Service {} is not configured",
                    name
                )));
            }
        }

        Ok((service, app))
    }
}

/// `us` -> `api.us.onelogin.com`
pub fn endpoint_for_region(region: &str) -> String {
    format!("api.{}.onelogin.com", region)
}

/// Owner-only access for files holding secrets
#[cfg(unix)]
pub fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn restrict_dir_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
