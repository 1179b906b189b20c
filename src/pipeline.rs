//! # Pipeline
//! Source → normalize → rank → notify, strictly sequential, one run per process.
//!
//! Policy:
//! - nothing fetched and at least one provider failed → `StageFailed(source)`
//! - nothing fetched, no provider failed → `EmptyResult` (ranker not called)
//! - otherwise rank and deliver the digest
//!
//! Whatever the outcome, exactly one notification attempt is made.

use chrono::{Local, NaiveDate};
use std::process::ExitCode;

use crate::config::AppConfig;
use crate::error::{NotifyError, SourceError};
use crate::ingest::{self, types::SourceProvider};
use crate::normalize::normalize_all;
use crate::notify::{Notifier, RunOutcome, Stage};
use crate::rank::Ranker;

/// Exit status when the notifier itself failed.
pub const EXIT_NOTIFY_FAILED: u8 = 1;
/// Exit status for configuration or other startup errors; nothing was sent.
pub const EXIT_STARTUP: u8 = 2;

/// Result of one run: the outcome and whether notifying about it worked.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub notification: Result<(), NotifyError>,
}

impl RunReport {
    /// `0` whenever the operator got a message, `1` when the notifier itself failed.
    pub fn exit_status(&self) -> u8 {
        match self.notification {
            Ok(()) => 0,
            Err(_) => EXIT_NOTIFY_FAILED,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

/// Exit status for a whole invocation; an error before the run maps to `2`.
pub fn exit_status<E>(result: &Result<RunReport, E>) -> u8 {
    match result {
        Ok(report) => report.exit_status(),
        Err(_) => EXIT_STARTUP,
    }
}

pub struct Pipeline<'a> {
    /// A provider that cannot be built (bad selector, client setup) fails the source stage.
    providers: Result<Vec<Box<dyn SourceProvider>>, SourceError>,
    max_candidates: usize,
    ranker: &'a dyn Ranker,
    notifier: Notifier<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        providers: Vec<Box<dyn SourceProvider>>,
        max_candidates: usize,
        ranker: &'a dyn Ranker,
        notifier: Notifier<'a>,
    ) -> Self {
        Self {
            providers: Ok(providers),
            max_candidates,
            ranker,
            notifier,
        }
    }

    pub fn from_config(cfg: &'a AppConfig, ranker: &'a dyn Ranker, notifier: Notifier<'a>) -> Self {
        Self {
            providers: ingest::build_providers(cfg),
            max_candidates: cfg.max_candidates,
            ranker,
            notifier,
        }
    }

    pub async fn run(&self) -> RunReport {
        self.run_on(Local::now().date_naive()).await
    }

    pub async fn run_on(&self, today: NaiveDate) -> RunReport {
        let outcome = self.produce_outcome().await;
        tracing::info!(outcome = outcome.label(), "pipeline finished; notifying");

        let notification = self.notifier.deliver(&outcome, today).await;
        if let Err(error) = &notification {
            tracing::error!(stage = %Stage::Notify, %error, "notification failed; operator was not informed by email");
        }
        RunReport {
            outcome,
            notification,
        }
    }

    async fn produce_outcome(&self) -> RunOutcome {
        let providers = match &self.providers {
            Ok(p) => p,
            Err(error) => {
                tracing::error!(%error, "could not set up source providers");
                return RunOutcome::StageFailed {
                    stage: Stage::Source,
                    detail: error.to_string(),
                };
            }
        };

        tracing::info!(providers = providers.len(), "searching for opportunities");
        let report = ingest::collect(providers, self.max_candidates).await;

        if report.candidates.is_empty() {
            if !report.unavailable.is_empty() {
                return RunOutcome::StageFailed {
                    stage: Stage::Source,
                    detail: report.failure_detail(),
                };
            }
            tracing::warn!("no relevant opportunities found this run");
            return RunOutcome::EmptyResult;
        }
        if !report.unavailable.is_empty() {
            tracing::warn!(
                failed = report.unavailable.len(),
                "continuing with partial source results; the digest will name the failed sources"
            );
        }

        let opportunities = normalize_all(report.candidates);
        tracing::info!(count = opportunities.len(), ranker = self.ranker.name(), "ranking opportunities");
        let digest = self.ranker.rank(&opportunities).await;
        RunOutcome::Delivered {
            digest,
            unavailable: report.unavailable,
        }
    }
}
