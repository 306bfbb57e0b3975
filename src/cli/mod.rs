// CLI interface
pub mod commands;
mod prompt;

use crate::config::{AppPaths, DEFAULT_PROFILE};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "onelogin-aws")]
#[command(about = "Temporary AWS credentials through OneLogin SAML", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding config.toml and caches [default: ~/.onelogin-aws-connector]
    #[arg(long, env = "ONELOGIN_AWS_HOME", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Enable verbose/debug logging
    #[arg(short = 'v', long = "debug", global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store the OneLogin API client and account settings
    Init {
        /// OneLogin API region, e.g. `us` or `eu`
        #[arg(long)]
        endpoint: Option<String>,

        /// OneLogin API client ID
        #[arg(long)]
        client_token: Option<String>,

        /// OneLogin API client secret
        #[arg(long)]
        client_secret: Option<String>,

        /// OneLogin subdomain (`<subdomain>.onelogin.com`)
        #[arg(long)]
        subdomain: Option<String>,

        #[arg(long)]
        username_or_email: Option<String>,
    },

    /// Map an AWS profile to a OneLogin app and IAM role
    Configure {
        #[arg(long)]
        app_id: Option<String>,

        #[arg(long)]
        role_arn: Option<String>,

        /// ARN of the SAML identity provider in IAM
        #[arg(long)]
        principal_arn: Option<String>,

        /// Session duration; 0 means 3600
        #[arg(long)]
        duration_seconds: Option<i32>,

        #[arg(long, env = "AWS_PROFILE", default_value = DEFAULT_PROFILE)]
        aws_profile: String,
    },

    /// Log in through OneLogin and write temporary credentials for the profile
    Login {
        #[arg(long, env = "AWS_PROFILE", default_value = DEFAULT_PROFILE)]
        aws_profile: String,

        /// Also write this region to ~/.aws/config for the profile
        #[arg(long)]
        aws_region: Option<String>,

        /// Client IP address to report to OneLogin
        #[arg(long)]
        ip_address: Option<String>,

        /// Ignore cached credentials and OneLogin token
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn execute(args: Cli) -> Result<()> {
    let paths = AppPaths::resolve(args.config_dir)?;

    match args.command {
        Commands::Init {
            endpoint,
            client_token,
            client_secret,
            subdomain,
            username_or_email,
        } => commands::init::execute(
            &paths,
            commands::init::ServiceArgs {
                endpoint,
                client_token,
                client_secret,
                subdomain,
                username_or_email,
            },
        ),
        Commands::Configure {
            app_id,
            role_arn,
            principal_arn,
            duration_seconds,
            aws_profile,
        } => commands::configure::execute(
            &paths,
            &aws_profile,
            commands::configure::AppArgs {
                app_id,
                role_arn,
                principal_arn,
                duration_seconds,
            },
        ),
        Commands::Login {
            aws_profile,
            aws_region,
            ip_address,
            force,
        } => {
            commands::login::execute(
                &paths,
                &aws_profile,
                aws_region.as_deref(),
                ip_address.as_deref(),
                force,
            )
            .await
        }
    }
}
