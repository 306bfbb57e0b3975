use super::http::{ApiRequest, HttpTransport};
use super::Status;
use crate::error::{AuthError, Result};
use crate::models::TokenValue;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;

const TOKEN_PATH: &str = "/auth/oauth2/v2/token";

/// Response of the OAuth2 v2 token endpoint, shared by both grants
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub account_id: i64,
}

impl TokenResponse {
    pub fn into_token_value(self) -> Result<TokenValue> {
        let created_at = parse_created_at(&self.created_at)?;
        TokenValue::from_exchange(
            self.access_token,
            self.refresh_token,
            created_at,
            self.expires_in,
        )
    }
}

/// `created_at` is UTC, e.g. `2024-01-01T00:00:00Z`, sometimes with fractional seconds
pub fn parse_created_at(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| AuthError::InvalidTimestamp(format!("'{}': {}", value, e)))
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokensApi: Send + Sync {
    /// client_credentials grant
    async fn generate(&self) -> Result<TokenResponse>;

    /// refresh_token grant
    async fn refresh(&self, access_token: String, refresh_token: String) -> Result<TokenResponse>;
}

/// OneLogin OAuth2 v2 token endpoint
pub struct OneLoginTokens<H: HttpTransport> {
    transport: H,
    client_id: String,
    client_secret: String,
}

impl<H: HttpTransport> OneLoginTokens<H> {
    pub fn new(transport: H, client_id: &str, client_secret: &str) -> Self {
        Self {
            transport,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    async fn exchange(&self, request: ApiRequest) -> Result<TokenResponse> {
        let body = self.transport.post(request).await?;
        let response: TokenResponse = serde_json::from_str(&body)?;

        match response.status {
            Some(status) if status.error => Err(status.into_error()),
            _ => Ok(response),
        }
    }
}

#[async_trait]
impl<H: HttpTransport> TokensApi for OneLoginTokens<H> {
    async fn generate(&self) -> Result<TokenResponse> {
        tracing::debug!("Generating OneLogin API token");

        self.exchange(ApiRequest {
            path: TOKEN_PATH.to_string(),
            authorization: Some(format!(
                "client_id:{}, client_secret:{}",
                self.client_id, self.client_secret
            )),
            body: json!({ "grant_type": "client_credentials" }),
        })
        .await
    }

    async fn refresh(&self, access_token: String, refresh_token: String) -> Result<TokenResponse> {
        tracing::debug!("Refreshing OneLogin API token");

        self.exchange(ApiRequest {
            path: TOKEN_PATH.to_string(),
            authorization: None,
            body: json!({
                "grant_type": "refresh_token",
                "access_token": access_token,
                "refresh_token": refresh_token,
            }),
        })
        .await
    }
}
