//! Run command - one check-in.

use anyhow::{Context, Result};
use checkin_core::RunReport;
use checkin_providers::{notifier_from_config, DriveClient, RunOutcome, SignInWorkflow};
use checkin_store::{AppConfig, CredentialStore, FileCredentialStore};
use tracing::{debug, error, info};

use crate::{Cli, OutputFormat};

/// Runs the check-in.
///
/// A failed step is reported and still ends the process normally. Only
/// problems before the chain starts (no credentials, no HTTP client) or a
/// failed write-back return an error.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::from_env(&cli.config);
    let store = FileCredentialStore::from_config(&config);
    let notifier = notifier_from_config(&config);

    let credentials = match store.load().await {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(error = %e, "Cannot load credentials");
            notifier
                .report(&RunReport::failure("", format!("load credentials error: {e}")))
                .await;
            return Err(e).context(format!("loading {}", config.credentials_path.display()));
        }
    };
    debug!(?credentials, "Credentials loaded");

    let api = match DriveClient::from_config(&config) {
        Ok(api) => api,
        Err(e) => {
            error!(error = %e, "Cannot build drive client");
            notifier
                .report(&RunReport::failure("", format!("client error: {e}")))
                .await;
            return Err(e.into());
        }
    };

    let workflow = SignInWorkflow::new(&api, notifier.as_ref());
    let outcome = workflow
        .run_and_persist(&store, credentials)
        .await
        .context("saving refreshed credentials")?;

    info!(
        success = outcome.is_success(),
        path = %config.credentials_path.display(),
        "Run finished, credentials saved"
    );

    if !cli.quiet {
        print_outcome(&outcome, cli.format)?;
    }

    Ok(())
}

fn print_outcome(outcome: &RunOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => match &outcome.report {
            RunReport::Success(summary) => println!(
                "✓ {}: {} check-ins this month, reward: {}, task: {}",
                summary.user_name, summary.sign_in_count, summary.reward, summary.task
            ),
            RunReport::Failure { message, .. } => println!("✗ {message}"),
        },
        OutputFormat::Json => println!("{}", serde_json::to_string(&outcome.report)?),
    }
    Ok(())
}
