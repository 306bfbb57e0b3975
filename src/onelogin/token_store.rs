use super::tokens::{TokenResponse, TokensApi};
use crate::error::{AuthError, Result};
use crate::models::{TokenState, TokenValue};
use chrono::Utc;
use tokio::sync::Mutex;

/// Holds the OneLogin API token and keeps it usable.
///
/// `get` returns the held token while its access part is live, refreshes it
/// while the refresh token is live, and generates a new one otherwise. A
/// refresh rejected as an invalid token falls back to generating once.
pub struct TokenStore<T: TokensApi> {
    api: T,
    current: Mutex<Option<TokenValue>>,
}

impl<T: TokensApi> TokenStore<T> {
    /// `cached` is usually whatever the token cache had on disk
    pub fn new(api: T, cached: Option<TokenValue>) -> Self {
        Self {
            api,
            current: Mutex::new(cached),
        }
    }

    pub async fn state(&self) -> TokenState {
        match self.current.lock().await.as_ref() {
            Some(token) => token.state_at(Utc::now()),
            None => TokenState::Empty,
        }
    }

    /// Snapshot of the held token, for persisting
    pub async fn current(&self) -> Option<TokenValue> {
        self.current.lock().await.clone()
    }

    pub async fn get(&self) -> Result<TokenValue> {
        let mut current = self.current.lock().await;

        let response = match current.as_ref() {
            None => {
                tracing::debug!("No OneLogin token held, generating one");
                self.api.generate().await?
            }
            Some(token) => match token.state_at(Utc::now()) {
                TokenState::Valid => return Ok(token.clone()),
                TokenState::AccessExpired => {
                    tracing::debug!(
                        "OneLogin access token expired at {}, refreshing",
                        token.access_expires_at
                    );
                    self.refresh(token).await?
                }
                TokenState::FullyExpired | TokenState::Empty => {
                    tracing::debug!(
                        "OneLogin refresh token expired at {}, generating a new token",
                        token.refresh_expires_at
                    );
                    self.api.generate().await?
                }
            },
        };

        let token = response.into_token_value()?;
        tracing::debug!("OneLogin access token valid until {}", token.access_expires_at);

        *current = Some(token.clone());
        Ok(token)
    }

    async fn refresh(&self, token: &TokenValue) -> Result<TokenResponse> {
        let refreshed = self
            .api
            .refresh(token.access_token.clone(), token.refresh_token.clone())
            .await;

        match refreshed {
            Err(AuthError::UnauthorizedToken) => {
                tracing::warn!("OneLogin rejected the refresh token, generating a new token");
                self.api.generate().await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tokens::MockTokensApi;
    use super::*;
    use chrono::{DateTime, Duration, Timelike};

    fn response_created_at(created_at: DateTime<Utc>, access_token: &str) -> TokenResponse {
        TokenResponse {
            status: None,
            access_token: access_token.to_string(),
            created_at: created_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            expires_in: 36000,
            refresh_token: format!("{}-refresh", access_token),
            token_type: "bearer".to_string(),
            account_id: 555555,
        }
    }

    fn token(access_expires_in: Duration, refresh_expires_in: Duration) -> TokenValue {
        let now = Utc::now();
        TokenValue {
            access_token: "held-access".to_string(),
            refresh_token: "held-refresh".to_string(),
            created_at: now - Duration::hours(1),
            access_expires_at: now + access_expires_in,
            refresh_expires_at: now + refresh_expires_in,
        }
    }

    #[tokio::test]
    async fn test_valid_token_makes_no_calls() {
        let held = token(Duration::hours(1), Duration::days(10));
        let mut api = MockTokensApi::new();
        api.expect_generate().never();
        api.expect_refresh().never();

        let store = TokenStore::new(api, Some(held.clone()));

        assert_eq!(store.state().await, TokenState::Valid);
        assert_eq!(store.get().await.unwrap(), held);
        assert_eq!(store.get().await.unwrap(), held);
    }

    #[tokio::test]
    async fn test_empty_store_generates() {
        let created_at = Utc::now();
        let mut api = MockTokensApi::new();
        api.expect_refresh().never();
        api.expect_generate()
            .times(1)
            .returning(move || Ok(response_created_at(created_at, "generated")));

        let store = TokenStore::new(api, None);
        assert_eq!(store.state().await, TokenState::Empty);

        let token = store.get().await.unwrap();
        assert_eq!(token.access_token, "generated");
        assert_eq!(store.current().await, Some(token));
        assert_eq!(store.state().await, TokenState::Valid);
    }

    #[tokio::test]
    async fn test_access_expired_refreshes_once() {
        let created_at = Utc::now() - Duration::seconds(5);
        let held = token(-Duration::minutes(1), Duration::days(10));

        let mut api = MockTokensApi::new();
        api.expect_generate().never();
        api.expect_refresh()
            .withf(|access, refresh| access == "held-access" && refresh == "held-refresh")
            .times(1)
            .returning(move |_, _| Ok(response_created_at(created_at, "refreshed")));

        let store = TokenStore::new(api, Some(held));
        assert_eq!(store.state().await, TokenState::AccessExpired);

        let token = store.get().await.unwrap();
        let expected_created_at = created_at.with_nanosecond(0).unwrap();
        assert_eq!(token.access_token, "refreshed");
        assert_eq!(token.created_at, expected_created_at);
        assert_eq!(
            token.refresh_expires_at,
            expected_created_at + Duration::days(45)
        );
    }

    #[tokio::test]
    async fn test_refresh_invalid_token_falls_back_to_generate() {
        let created_at = Utc::now();
        let held = token(-Duration::minutes(1), Duration::days(10));

        let mut api = MockTokensApi::new();
        api.expect_refresh()
            .times(1)
            .returning(|_, _| Err(AuthError::UnauthorizedToken));
        api.expect_generate()
            .times(1)
            .returning(move || Ok(response_created_at(created_at, "generated")));

        let store = TokenStore::new(api, Some(held));
        let token = store.get().await.unwrap();

        assert_eq!(token.access_token, "generated");
    }

    #[tokio::test]
    async fn test_other_refresh_errors_propagate() {
        let held = token(-Duration::minutes(1), Duration::days(10));

        let mut api = MockTokensApi::new();
        api.expect_generate().never();
        api.expect_refresh().times(1).returning(|_, _| {
            Err(AuthError::Provider {
                code: 500,
                kind: "server error".to_string(),
                message: "Internal Server Error".to_string(),
            })
        });

        let store = TokenStore::new(api, Some(held.clone()));
        let err = store.get().await.unwrap_err();

        assert_eq!(err.to_string(), "[500] server error: Internal Server Error");
        assert_eq!(store.current().await, Some(held));
    }

    #[tokio::test]
    async fn test_fully_expired_generates_without_refresh() {
        let created_at = Utc::now();
        let held = token(-Duration::days(2), -Duration::days(1));

        let mut api = MockTokensApi::new();
        api.expect_refresh().never();
        api.expect_generate()
            .times(1)
            .returning(move || Ok(response_created_at(created_at, "generated")));

        let store = TokenStore::new(api, Some(held));
        assert_eq!(store.state().await, TokenState::FullyExpired);

        let token = store.get().await.unwrap();
        assert_eq!(token.access_token, "generated");
    }

    #[tokio::test]
    async fn test_generate_failure_leaves_store_empty() {
        let mut api = MockTokensApi::new();
        api.expect_generate().times(1).returning(|| {
            Err(AuthError::Transport("connection refused".to_string()))
        });

        let store = TokenStore::new(api, None);

        assert!(matches!(store.get().await, Err(AuthError::Transport(_))));
        assert_eq!(store.current().await, None);
    }
}
