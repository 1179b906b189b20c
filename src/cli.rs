// src/cli.rs
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{AppConfig, Profile};
use crate::metrics::Metrics;
use crate::notify::{email::SmtpMailer, Notifier};
use crate::pipeline::{Pipeline, RunReport};
use crate::rank::build_ranker;
use crate::telemetry::{LogFormat, DEFAULT_LOG_FILTER};

#[derive(Parser, Debug)]
#[command(
    name = "opportunity-digest",
    about = "Search for opportunities, rank them, and email a digest",
    version
)]
pub struct Cli {
    /// TOML config file (else DIGEST_CONFIG_PATH, else config/digest.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Built-in profile: careers or papers
    #[arg(long)]
    pub profile: Option<Profile>,
    /// Print the message that would be sent instead of sending it
    #[arg(long)]
    pub dry_run: bool,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = DEFAULT_LOG_FILTER)]
    pub log_level: String,
    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    pub fn log_format(&self) -> LogFormat {
        if self.log_json {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }

    /// Load config, wire the stages and run once. Errors here are startup errors.
    pub async fn execute(&self) -> anyhow::Result<RunReport> {
        let cfg = AppConfig::load(self.config.as_deref(), self.profile).context("loading configuration")?;
        let metrics = Metrics::install();

        tracing::info!(
            profile = %cfg.profile,
            sources = cfg.sources.len(),
            max_candidates = cfg.max_candidates,
            dry_run = self.dry_run,
            "configuration loaded"
        );

        let ranker = build_ranker(&cfg.ranking);
        let notifier = if self.dry_run {
            Notifier::preview(&cfg.notify)
        } else {
            Notifier::new(&cfg.notify, Box::new(SmtpMailer::from_config(&cfg.notify)))
        };

        let report = Pipeline::from_config(&cfg, ranker.as_ref(), notifier).run().await;

        if let Some(m) = &metrics {
            tracing::debug!(snapshot = %m.render(), "run metrics");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from([
            "opportunity-digest",
            "--profile",
            "papers",
            "--dry-run",
            "--config",
            "alt.toml",
        ])
        .unwrap();
        assert_eq!(cli.profile, Some(Profile::Papers));
        assert!(cli.dry_run);
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert_eq!(cli.log_format(), LogFormat::Compact);
    }

    #[test]
    fn unknown_profile_is_rejected() {
        assert!(Cli::try_parse_from(["opportunity-digest", "--profile", "stocks"]).is_err());
    }
}
