use super::http::{ApiRequest, HttpTransport};
use super::token_store::TokenStore;
use super::tokens::TokensApi;
use super::Status;
use crate::error::{AuthError, Result};
use crate::models::{AssertionResult, Device, Factor, LoginParameters};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const GENERATE_PATH: &str = "/api/1/saml_assertion";
const VERIFY_FACTOR_PATH: &str = "/api/1/saml_assertion/verify_factor";

const SUCCESS_MESSAGE: &str = "Success";
const PENDING_TYPE: &str = "pending";

/// Device type that can approve a login from a push notification
pub const PUSH_DEVICE_TYPE: &str = "OneLogin Protect";
/// Label of the synthetic "send a push instead" menu entry
pub const PUSH_NOTIFY_LABEL: &str = "Notify to OneLogin Protect";

pub const DEFAULT_MAX_POLLS: u32 = 60;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub username_or_email: String,
    pub password: String,
    pub app_id: String,
    pub subdomain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl From<&LoginParameters> for GenerateRequest {
    fn from(params: &LoginParameters) -> Self {
        Self {
            username_or_email: params.username_or_email.clone(),
            password: params.password.clone(),
            app_id: params.app_id.clone(),
            subdomain: params.subdomain.clone(),
            ip_address: params.ip_address.clone(),
        }
    }
}

impl fmt::Debug for GenerateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateRequest")
            .field("username_or_email", &self.username_or_email)
            .field("password", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("subdomain", &self.subdomain)
            .field("ip_address", &self.ip_address)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyFactorRequest {
    pub app_id: String,
    pub device_id: String,
    pub state_token: String,
    pub otp_token: String,
    pub do_not_notify: bool,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Status,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, PartialEq, Eq)]
enum VerifyOutcome {
    Saml(String),
    Pending(Status),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssertionApi: Send + Sync {
    /// Ask for an assertion; the provider may answer with MFA factors instead
    async fn generate(&self, request: GenerateRequest) -> Result<AssertionResult>;

    /// Answer an MFA factor, polling while a push approval is pending
    async fn verify_factor(&self, request: VerifyFactorRequest) -> Result<String>;
}

/// OneLogin SAML assertion endpoints, authenticated with the token store's bearer token
pub struct SamlAssertionClient<H: HttpTransport, T: TokensApi> {
    transport: H,
    tokens: Arc<TokenStore<T>>,
    max_polls: u32,
    poll_interval: Duration,
}

impl<H: HttpTransport, T: TokensApi> SamlAssertionClient<H, T> {
    pub fn new(transport: H, tokens: Arc<TokenStore<T>>) -> Self {
        Self {
            transport,
            tokens,
            max_polls: DEFAULT_MAX_POLLS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    async fn post(&self, path: &str, body: Value) -> Result<String> {
        let token = self.tokens.get().await?;

        self.transport
            .post(ApiRequest {
                path: path.to_string(),
                authorization: Some(format!("bearer:{}", token.access_token)),
                body,
            })
            .await
    }
}

#[async_trait]
impl<H: HttpTransport, T: TokensApi> AssertionApi for SamlAssertionClient<H, T> {
    async fn generate(&self, request: GenerateRequest) -> Result<AssertionResult> {
        tracing::debug!("Requesting SAML assertion for app {}", request.app_id);

        let body = self
            .post(GENERATE_PATH, serde_json::to_value(&request)?)
            .await?;
        decode_generate(&body)
    }

    async fn verify_factor(&self, mut request: VerifyFactorRequest) -> Result<String> {
        let mut polls = 0;

        loop {
            let body = self
                .post(VERIFY_FACTOR_PATH, serde_json::to_value(&request)?)
                .await?;

            match decode_verify(&body)? {
                VerifyOutcome::Saml(saml) => return Ok(saml),
                VerifyOutcome::Pending(status) => {
                    if polls >= self.max_polls {
                        return Err(AuthError::Timeout {
                            code: status.code,
                            message: status.message,
                        });
                    }
                    polls += 1;
                    tracing::debug!(
                        "Factor verification pending ({}), poll {} of {}",
                        status.message,
                        polls,
                        self.max_polls
                    );

                    sleep(self.poll_interval).await;
                    request.do_not_notify = true;
                }
            }
        }
    }
}

fn decode_generate(body: &str) -> Result<AssertionResult> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.status.error {
        return Err(envelope.status.into_error());
    }

    if envelope.status.message == SUCCESS_MESSAGE {
        let saml: String = serde_json::from_value(envelope.data)?;
        if saml.is_empty() {
            return Err(AuthError::Transport(
                "SAML assertion response carried no assertion".to_string(),
            ));
        }
        return Ok(AssertionResult::Saml(saml));
    }

    let mut factors: Vec<Factor> = serde_json::from_value(envelope.data)?;
    let first = factors.first_mut().ok_or_else(|| {
        AuthError::Transport("SAML assertion response carried no MFA factors".to_string())
    })?;
    first.devices = expand_devices(std::mem::take(&mut first.devices));

    tracing::debug!(
        "MFA required ({}), {} device option(s), callback {}",
        envelope.status.message,
        first.devices.len(),
        first.callback_url
    );
    Ok(AssertionResult::Factors(factors))
}

/// Every listed device answers with an OTP. Each push-capable device also
/// gets a sibling entry, appended after the originals in device order, that
/// sends a push notification instead.
fn expand_devices(devices: Vec<Device>) -> Vec<Device> {
    let push_options: Vec<Device> = devices
        .iter()
        .filter(|device| device.device_type == PUSH_DEVICE_TYPE)
        .map(|device| Device {
            device_id: device.device_id,
            device_type: PUSH_NOTIFY_LABEL.to_string(),
            requires_otp: false,
        })
        .collect();

    devices
        .into_iter()
        .map(|device| Device {
            requires_otp: true,
            ..device
        })
        .chain(push_options)
        .collect()
}

fn decode_verify(body: &str) -> Result<VerifyOutcome> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.status.error {
        return Err(envelope.status.into_error());
    }

    if envelope.status.kind == PENDING_TYPE {
        return Ok(VerifyOutcome::Pending(envelope.status));
    }

    let saml: String = serde_json::from_value(envelope.data)?;
    Ok(VerifyOutcome::Saml(saml))
}
