use crate::cli::prompt::{self, TerminalInteraction};
use crate::config::{AppPaths, Config};
use crate::credentials::CredentialManager;
use crate::error::Result;
use crate::login::Login;
use crate::models::LoginParameters;
use crate::onelogin::{
    OneLoginTokens, ReqwestTransport, SamlAssertionClient, TokenCache, TokenStore,
};
use crate::sts::StsRoleAssumer;
use std::sync::Arc;

pub async fn execute(
    paths: &AppPaths,
    profile: &str,
    region: Option<&str>,
    ip_address: Option<&str>,
    force: bool,
) -> Result<()> {
    paths.ensure()?;
    let credentials = CredentialManager::new(paths)?;

    if !force {
        if let Some(creds) = credentials.cached(profile)? {
            println!("✓ Credentials for {} are still valid", profile);
            println!("  Expires in: {}", creds.expiration_display());
            return Ok(());
        }
    }

    let config = Config::load(&paths.config_file)?;
    let (service, app) = config.login_profile(profile)?;

    // Keep the API token on disk as soon as it is valid, even if the login below fails
    let token_cache = TokenCache::new(&paths.cache_dir)?;
    let cached_token = if force {
        token_cache.remove_token(&service.client_token)?;
        None
    } else {
        token_cache.get_token(&service.client_token)?
    };

    let transport = ReqwestTransport::new(&service.endpoint)?;
    let tokens = Arc::new(TokenStore::new(
        OneLoginTokens::new(
            transport.clone(),
            &service.client_token,
            &service.client_secret,
        ),
        cached_token,
    ));
    tracing::debug!("Cached OneLogin token state: {:?}", tokens.state().await);
    let token = tokens.get().await?;
    token_cache.save_token(&service.client_token, &token)?;
    tracing::debug!("OneLogin API token expires in {}", token.expiration_display());

    let username_or_email = if service.username_or_email.is_empty() {
        prompt::read_username()?
    } else {
        service.username_or_email.clone()
    };
    let password = prompt::read_password()?;

    let params = LoginParameters {
        username_or_email,
        password,
        app_id: app.app_id.clone(),
        subdomain: service.subdomain.clone(),
        principal_arn: app.principal_arn.clone(),
        role_arn: app.role_arn.clone(),
        duration_seconds: app.duration_seconds,
        ip_address: ip_address.map(str::to_string),
    };

    let assertion = SamlAssertionClient::new(transport, Arc::clone(&tokens));
    let roles = StsRoleAssumer::new(region).await;
    let mut login = Login::new(assertion, roles, params);
    let result = login.login(&TerminalInteraction).await;
    tracing::debug!("Login finished in state {:?}", login.state());
    let creds = result?;

    credentials.store(profile, &creds, region)?;
    if let Some(token) = tokens.current().await {
        token_cache.save_token(&service.client_token, &token)?;
    }

    println!("✓ Login successful!");
    println!("  Profile: {}", profile);
    if let Some(region) = region {
        println!("  Region: {}", region);
    }
    println!("  Credentials expire in: {}", creds.expiration_display());

    Ok(())
}
