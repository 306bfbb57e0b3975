use crate::config::{endpoint_for_region, AppPaths, Config, ServiceConfig, DEFAULT_SERVICE};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct ServiceArgs {
    /// Region, expanded to the API host
    pub endpoint: Option<String>,
    pub client_token: Option<String>,
    pub client_secret: Option<String>,
    pub subdomain: Option<String>,
    pub username_or_email: Option<String>,
}

pub fn execute(paths: &AppPaths, args: ServiceArgs) -> Result<()> {
    paths.ensure()?;

    let mut config = Config::load(&paths.config_file)?;
    let service = config
        .service
        .entry(DEFAULT_SERVICE.to_string())
        .or_default();
    merge(service, args);
    config.save(&paths.config_file)?;

    println!("✓ OneLogin service configured");
    println!("  Config: {}", paths.config_file.display());

    Ok(())
}

/// Only non-empty flags overwrite what is already stored
fn merge(service: &mut ServiceConfig, args: ServiceArgs) {
    let updates = [
        (&mut service.endpoint, args.endpoint.map(|r| endpoint_for_region(&r))),
        (&mut service.client_token, args.client_token),
        (&mut service.client_secret, args.client_secret),
        (&mut service.subdomain, args.subdomain),
        (&mut service.username_or_email, args.username_or_email),
    ];

    for (field, value) in updates {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            *field = value;
        }
    }
}
