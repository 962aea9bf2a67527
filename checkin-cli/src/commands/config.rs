//! Config command - inspect configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use checkin_store::AppConfig;

use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the resolved configuration with secrets redacted.
    Show,

    /// Show the credential document path.
    Path,
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    let config = AppConfig::from_env(&cli.config);

    match &args.action {
        ConfigAction::Show => show_config(&config, cli.format),
        ConfigAction::Path => show_path(&config, cli.format),
    }
}

fn show_config(config: &AppConfig, format: OutputFormat) -> Result<()> {
    let summary = config.summary();

    match format {
        OutputFormat::Text => {
            let or_unset = |v: &Option<String>| v.clone().unwrap_or_else(|| "(unset)".to_string());

            println!("Check-in Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Credential document: {}", summary.credentials_path);
            println!("Env access_token:    {}", or_unset(&summary.env_access_token));
            println!("Env refresh_token:   {}", or_unset(&summary.env_refresh_token));
            println!();
            println!("Webhook URL:         {}", or_unset(&summary.webhook_url));
            println!("Webhook secret:      {}", or_unset(&summary.webhook_secret));
            println!(
                "Notifications:       {}",
                if config.notifications_enabled() { "enabled" } else { "disabled" }
            );
            println!();
            println!("Request timeout:     {}s", summary.request_timeout_secs);
            println!("Attempts per step:   {}", summary.max_attempts);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn show_path(config: &AppConfig, format: OutputFormat) -> Result<()> {
    let path = std::path::absolute(&config.credentials_path)
        .unwrap_or_else(|_| config.credentials_path.clone());

    match format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => {
            let paths = serde_json::json!({ "credentials_file": path.display().to_string() });
            println!("{}", serde_json::to_string_pretty(&paths)?);
        }
    }

    Ok(())
}
