// onelogin-aws - AWS credentials through OneLogin SAML

mod aws_config;
mod cli;
mod config;
mod credentials;
mod error;
mod login;
mod models;
mod onelogin;
mod sts;

use clap::Parser;
use error::Result;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Cli::parse();

    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Prompts own stdout, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    ExitCode::from(report(cli::execute(args).await))
}

/// Print a failed command's error and map the outcome to an exit status
fn report(result: Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}
