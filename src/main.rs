//! Opportunity digest: one run per invocation.
//! Search → normalize → rank → email, then exit. Scheduling is left to cron or a
//! systemd timer.

use clap::Parser;
use std::process::ExitCode;

use opportunity_digest::cli::Cli;
use opportunity_digest::pipeline::{exit_status, EXIT_STARTUP};
use opportunity_digest::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(error) = telemetry::init(&cli.log_level, cli.log_format()) {
        eprintln!("opportunity-digest: {error}");
        return ExitCode::from(EXIT_STARTUP);
    }

    let result = cli.execute().await;
    if let Err(error) = &result {
        tracing::error!(error = %format!("{error:#}"), "startup failed; nothing was sent");
    }
    ExitCode::from(exit_status(&result))
}
