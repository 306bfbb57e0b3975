// AWS STS role assumption with a SAML assertion
use crate::error::{AuthError, Result};
use crate::models::CloudCredentials;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::Client as StsClient;
use aws_smithy_types::error::display::DisplayErrorContext;
use chrono::{DateTime, TimeZone, Utc};

const DEFAULT_STS_REGION: &str = "us-east-1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub saml_assertion: String,
    pub principal_arn: String,
    pub role_arn: String,
    pub duration_seconds: i32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleAssumer: Send + Sync {
    async fn assume_role_with_saml(&self, request: AssumeRoleRequest) -> Result<CloudCredentials>;
}

pub struct StsRoleAssumer {
    client: StsClient,
}

impl StsRoleAssumer {
    /// AssumeRoleWithSAML is unsigned, so no AWS credentials are loaded.
    /// Region comes from the argument, then the environment/profile, then us-east-1.
    pub async fn new(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).no_credentials();
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let mut config = loader.load().await;

        if config.region().is_none() {
            tracing::debug!("No AWS region configured, using {} for STS", DEFAULT_STS_REGION);
            config = aws_config::defaults(BehaviorVersion::latest())
                .no_credentials()
                .region(Region::new(DEFAULT_STS_REGION))
                .load()
                .await;
        }

        Self {
            client: StsClient::new(&config),
        }
    }
}

#[async_trait]
impl RoleAssumer for StsRoleAssumer {
    async fn assume_role_with_saml(&self, request: AssumeRoleRequest) -> Result<CloudCredentials> {
        tracing::info!("Assuming {} with SAML", request.role_arn);
        tracing::debug!(
            "Principal: {}, duration: {}s",
            request.principal_arn,
            request.duration_seconds
        );

        let response = self
            .client
            .assume_role_with_saml()
            .role_arn(&request.role_arn)
            .principal_arn(&request.principal_arn)
            .saml_assertion(&request.saml_assertion)
            .duration_seconds(request.duration_seconds)
            .send()
            .await
            .map_err(|e| AuthError::AwsSdk(DisplayErrorContext(&e).to_string()))?;

        let creds = response
            .credentials()
            .ok_or_else(|| AuthError::AwsSdk("No credentials in response".to_string()))?;

        Ok(CloudCredentials {
            access_key_id: creds.access_key_id().to_string(),
            secret_access_key: creds.secret_access_key().to_string(),
            session_token: creds.session_token().to_string(),
            expiration: to_utc(creds.expiration())?,
        })
    }
}

fn to_utc(timestamp: &aws_smithy_types::DateTime) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp.secs(), timestamp.subsec_nanos())
        .single()
        .ok_or_else(|| AuthError::AwsSdk("Invalid expiration timestamp".to_string()))
}
