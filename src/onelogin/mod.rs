// OneLogin API clients: OAuth2 tokens, SAML assertions, token caching
mod assertion;
mod http;
mod token_cache;
mod token_store;
mod tokens;

pub use assertion::{AssertionApi, GenerateRequest, SamlAssertionClient, VerifyFactorRequest};
pub use http::ReqwestTransport;
pub use token_cache::TokenCache;
pub use token_store::TokenStore;
pub use tokens::OneLoginTokens;

#[cfg(test)]
pub use assertion::MockAssertionApi;

use crate::error::AuthError;
use serde::Deserialize;

/// Status envelope carried by every OneLogin API response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Status {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub code: i64,
}

impl Status {
    /// The token endpoint's answer to a revoked or unknown refresh token
    pub fn is_invalid_token(&self) -> bool {
        self.code == 401 && self.message == "Invalid Token"
    }

    pub fn into_error(self) -> AuthError {
        if self.is_invalid_token() {
            return AuthError::UnauthorizedToken;
        }
        AuthError::Provider {
            code: self.code,
            kind: self.kind,
            message: self.message,
        }
    }
}
