use crate::config::{AppConfig, AppPaths, Config, DEFAULT_SERVICE};
use crate::error::{AuthError, Result};

#[derive(Debug, Default)]
pub struct AppArgs {
    pub app_id: Option<String>,
    pub role_arn: Option<String>,
    pub principal_arn: Option<String>,
    pub duration_seconds: Option<i32>,
}

pub fn execute(paths: &AppPaths, profile: &str, args: AppArgs) -> Result<()> {
    let mut config = Config::load(&paths.config_file)?;

    if !config.service.contains_key(DEFAULT_SERVICE) {
        return Err(AuthError::ConfigError(
            "There is no initialized service. Please run `onelogin-aws init`".to_string(),
        ));
    }

    let app = config.app.entry(profile.to_string()).or_default();
    merge(app, args);
    config.save(&paths.config_file)?;

    println!("✓ Configured AWS profile: {}", profile);
    Ok(())
}

fn merge(app: &mut AppConfig, args: AppArgs) {
    let updates = [
        (&mut app.app_id, args.app_id),
        (&mut app.role_arn, args.role_arn),
        (&mut app.principal_arn, args.principal_arn),
    ];

    for (field, value) in updates {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            *field = value;
        }
    }

    if let Some(duration) = args.duration_seconds {
        app.duration_seconds = duration;
    }
}
