use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

const USER_AGENT: &str = concat!("onelogin-aws/", env!("CARGO_PKG_VERSION"));

/// A JSON POST against the OneLogin API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Sends requests to the provider and hands back the raw response body.
/// Error statuses still carry a JSON envelope, so they are not failures here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(&self, request: ApiRequest) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl ReqwestTransport {
    /// `endpoint` is a host (optionally `host:port`) such as `api.us.onelogin.com`
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("https://{}{}", self.endpoint, path)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, request: ApiRequest) -> Result<String> {
        let url = self.url(&request.path);
        tracing::debug!("POST {}", url);

        let mut builder = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&request.body);

        if let Some(authorization) = request.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("{} responded with HTTP {}", request.path, status.as_u16());
        Ok(body)
    }
}
