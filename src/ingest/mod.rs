// src/ingest/mod.rs
//! Source adapter: builds the configured providers and collects their
//! candidates without ever failing the run on an ordinary provider error.

pub mod providers;
pub mod types;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::fmt;
use std::time::Duration;

use crate::config::{AppConfig, SourceSpec};
use crate::error::SourceError;
use crate::ingest::providers::{
    rss::RssProvider, scrape::ScrapeProvider, search_api::SearchApiProvider,
    static_list::StaticListProvider,
};
use crate::ingest::types::{RawCandidate, SourceProvider};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "digest_candidates_total",
            "Raw candidates kept from providers."
        );
        describe_counter!(
            "digest_source_errors_total",
            "Provider fetch/parse errors."
        );
    });
}

/// A provider that could not contribute this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnavailable {
    pub provider: &'static str,
    pub error: SourceError,
}

impl fmt::Display for SourceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

/// Everything the adapter learned in one run.
#[derive(Debug, Default)]
pub struct SourceReport {
    pub candidates: Vec<RawCandidate>,
    pub unavailable: Vec<SourceUnavailable>,
}

impl SourceReport {
    /// Detail string for a failed source stage: the bare error for a single
    /// provider, `name: error` pairs otherwise.
    pub fn failure_detail(&self) -> String {
        match self.unavailable.as_slice() {
            [only] => only.error.to_string(),
            many => many.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
        }
    }
}

pub fn build_providers(cfg: &AppConfig) -> Result<Vec<Box<dyn SourceProvider>>, SourceError> {
    let cap = cfg.max_candidates;
    let timeout = Duration::from_secs(cfg.source_timeout_secs);

    cfg.sources
        .iter()
        .map(|spec| -> Result<Box<dyn SourceProvider>, SourceError> {
            Ok(match spec {
                SourceSpec::Scrape(s) => Box::new(ScrapeProvider::new(s, cap, timeout)?),
                SourceSpec::SearchApi(s) => Box::new(SearchApiProvider::new(s, cap, timeout)?),
                SourceSpec::Rss(s) => Box::new(RssProvider::new(s, cap, timeout)?),
                SourceSpec::Static(s) => Box::new(StaticListProvider::new(s, cap)),
            })
        })
        .collect()
}

/// Query every provider in order and concatenate what they return, capped at `cap`.
/// Provider errors are recorded in the report, never propagated.
pub async fn collect(providers: &[Box<dyn SourceProvider>], cap: usize) -> SourceReport {
    ensure_metrics_described();

    let mut report = SourceReport::default();
    for p in providers {
        match p.fetch_candidates().await {
            Ok(mut v) => report.candidates.append(&mut v),
            Err(error) => {
                tracing::warn!(%error, provider = p.name(), "source unavailable");
                counter!("digest_source_errors_total").increment(1);
                report.unavailable.push(SourceUnavailable {
                    provider: p.name(),
                    error,
                });
            }
        }
    }

    report.candidates.truncate(cap);
    counter!("digest_candidates_total").increment(report.candidates.len() as u64);
    tracing::info!(
        found = report.candidates.len(),
        failed_providers = report.unavailable.len(),
        "source stage finished"
    );
    report
}
