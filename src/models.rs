use crate::error::{AuthError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifetime of a OneLogin refresh token. The token endpoint does not report it.
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 45;

/// Fallback for `duration_seconds` when the profile leaves it unset.
pub const DEFAULT_DURATION_SECONDS: i32 = 3600;

/// OneLogin API access/refresh token pair with derived expiry timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValue {
    pub access_token: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Where a held token sits relative to the wall clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Empty,
    Valid,
    AccessExpired,
    FullyExpired,
}

impl TokenValue {
    /// Build a token value from a generate/refresh exchange.
    /// Both expiry timestamps are derived from `created_at`; a negative or
    /// unrepresentable `expires_in` is rejected.
    pub fn from_exchange(
        access_token: String,
        refresh_token: String,
        created_at: DateTime<Utc>,
        expires_in: i64,
    ) -> Result<Self> {
        if expires_in < 0 {
            return Err(AuthError::InvalidTimestamp(format!(
                "negative expires_in: {}",
                expires_in
            )));
        }

        let access_expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| created_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::InvalidTimestamp(format!("expires_in out of range: {}", expires_in))
            })?;
        let refresh_expires_at = Duration::try_days(REFRESH_TOKEN_LIFETIME_DAYS)
            .and_then(|lifetime| created_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::InvalidTimestamp(format!("created_at out of range: {}", created_at))
            })?;

        Ok(Self {
            access_token,
            refresh_token,
            created_at,
            access_expires_at,
            refresh_expires_at,
        })
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        if now < self.access_expires_at {
            TokenState::Valid
        } else if now < self.refresh_expires_at {
            TokenState::AccessExpired
        } else {
            TokenState::FullyExpired
        }
    }

    pub fn expires_in_seconds(&self) -> i64 {
        (self.access_expires_at - Utc::now()).num_seconds().max(0)
    }

    pub fn expiration_display(&self) -> String {
        format_remaining(self.expires_in_seconds())
    }
}

/// One MFA device offered by a pending factor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: i64,
    pub device_type: String,
    /// Set during normalization; the provider never sends it.
    #[serde(default, skip_serializing)]
    pub requires_otp: bool,
}

/// Provider's view of the user being challenged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorUser {
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub id: i64,
}

impl FactorUser {
    /// "First Last <email>", falling back to the username when names are missing
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.firstname, self.lastname);
        let name = name.trim();
        let name = if name.is_empty() { &self.username } else { name };

        if self.email.is_empty() {
            name.to_string()
        } else {
            format!("{} <{}>", name, self.email)
        }
    }
}

/// Pending MFA challenge returned instead of an assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factor {
    pub state_token: String,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub callback_url: String,
    #[serde(default)]
    pub user: Option<FactorUser>,
}

/// Outcome of a generate-assertion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionResult {
    Saml(String),
    Factors(Vec<Factor>),
}

impl AssertionResult {
    pub fn saml(&self) -> Option<&str> {
        match self {
            AssertionResult::Saml(saml) => Some(saml),
            AssertionResult::Factors(_) => None,
        }
    }

    pub fn factors(&self) -> &[Factor] {
        match self {
            AssertionResult::Saml(_) => &[],
            AssertionResult::Factors(factors) => factors,
        }
    }
}

/// Everything one login attempt needs, fixed for its lifetime
#[derive(Clone, PartialEq, Eq)]
pub struct LoginParameters {
    pub username_or_email: String,
    pub password: String,
    pub app_id: String,
    pub subdomain: String,
    pub principal_arn: String,
    pub role_arn: String,
    pub duration_seconds: i32,
    /// Client IP forwarded to the provider, for IP-based MFA policies
    pub ip_address: Option<String>,
}

impl LoginParameters {
    /// Session duration sent to STS; zero means "use the default"
    pub fn effective_duration(&self) -> i32 {
        if self.duration_seconds == 0 {
            DEFAULT_DURATION_SECONDS
        } else {
            self.duration_seconds
        }
    }
}

impl fmt::Debug for LoginParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginParameters")
            .field("username_or_email", &self.username_or_email)
            .field("password", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("subdomain", &self.subdomain)
            .field("principal_arn", &self.principal_arn)
            .field("role_arn", &self.role_arn)
            .field("duration_seconds", &self.duration_seconds)
            .field("ip_address", &self.ip_address)
            .finish()
    }
}

/// AWS temporary credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl CloudCredentials {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expiration
    }

    pub fn expires_in_seconds(&self) -> i64 {
        (self.expiration - Utc::now()).num_seconds().max(0)
    }

    /// Format expiration time as human-readable string
    pub fn expiration_display(&self) -> String {
        format_remaining(self.expires_in_seconds())
    }
}

fn format_remaining(seconds: i64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        "EXPIRED".to_string()
    }
}
