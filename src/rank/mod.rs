// src/rank/mod.rs
//! Ranker/summarizer: turns the candidate list into exactly one `Digest`.
//!
//! The service path's ordering is whatever the model returns; the fallback's
//! ordering is strictly discovery order.

pub mod ai_adapter;
pub mod fallback;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::RankingConfig;
use crate::error::RankingError;
use crate::normalize::Opportunity;
use crate::rank::ai_adapter::{build_prompt, OpenAiProvider, Provider};

/// The single rendered output of the ranking stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Digest {
    /// Service response, verbatim.
    Narrative(String),
    /// First `min(5, n)` opportunities in discovery order.
    Fallback(Vec<Opportunity>),
}

impl Digest {
    pub fn fallback_for(opportunities: &[Opportunity]) -> Self {
        Digest::Fallback(fallback::select(opportunities))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Digest::Fallback(_))
    }

    pub fn render(&self) -> String {
        match self {
            Digest::Narrative(text) => text.clone(),
            Digest::Fallback(entries) => fallback::render(entries),
        }
    }
}

pub type RankFuture<'a> = Pin<Box<dyn Future<Output = Digest> + Send + 'a>>;

/// Strategy seam. Callers must not pass an empty slice.
pub trait Ranker: Send + Sync {
    fn rank<'a>(&'a self, opportunities: &'a [Opportunity]) -> RankFuture<'a>;
    fn name(&self) -> &'static str;
}

pub type DynRanker = Arc<dyn Ranker>;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "digest_ranking_fallback_total",
            "Runs that used the deterministic fallback digest."
        );
    });
}

/// Metric label for why the fallback digest was used.
pub fn fallback_reason(reason: &RankingError) -> &'static str {
    match reason {
        RankingError::NotConfigured => "not-configured",
        RankingError::Request(_) => "request",
        RankingError::Status(_) => "status",
        RankingError::Malformed(_) => "malformed",
    }
}

fn record_fallback(reason: &RankingError) {
    ensure_metrics_described();
    counter!("digest_ranking_fallback_total", "reason" => fallback_reason(reason)).increment(1);
}

/// Always the deterministic listing: no service configured, or its client
/// could not be built. `reason` says which.
pub struct FallbackRanker {
    reason: RankingError,
}

impl FallbackRanker {
    pub fn new(reason: RankingError) -> Self {
        Self { reason }
    }

    pub fn not_configured() -> Self {
        Self::new(RankingError::NotConfigured)
    }

    pub fn reason(&self) -> &RankingError {
        &self.reason
    }
}

impl Ranker for FallbackRanker {
    fn rank<'a>(&'a self, opportunities: &'a [Opportunity]) -> RankFuture<'a> {
        record_fallback(&self.reason);
        Box::pin(async move { Digest::fallback_for(opportunities) })
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

/// Asks the ranking service once; any failure yields the fallback digest.
pub struct ServiceRanker<P: Provider> {
    provider: P,
    system_prompt: String,
    instructions: String,
}

impl<P: Provider> ServiceRanker<P> {
    pub fn new(provider: P, cfg: &RankingConfig) -> Self {
        Self {
            provider,
            system_prompt: cfg.system_prompt.clone(),
            instructions: cfg.instructions.clone(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn rank_impl(&self, opportunities: &[Opportunity]) -> Digest {
        let prompt = build_prompt(&self.instructions, opportunities);
        tracing::info!(
            provider = self.provider.name(),
            entries = opportunities.len(),
            "requesting ranked summary"
        );

        match self.provider.complete(&self.system_prompt, &prompt).await {
            Ok(text) => {
                tracing::info!(provider = self.provider.name(), "ranked summary received");
                Digest::Narrative(text)
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    provider = self.provider.name(),
                    "ranking service unavailable; using deterministic fallback"
                );
                record_fallback(&error);
                Digest::fallback_for(opportunities)
            }
        }
    }
}

impl<P: Provider> Ranker for ServiceRanker<P> {
    fn rank<'a>(&'a self, opportunities: &'a [Opportunity]) -> RankFuture<'a> {
        Box::pin(self.rank_impl(opportunities))
    }

    fn name(&self) -> &'static str {
        self.provider.name()
    }
}

/// Factory: service ranker when a credential is present, fallback otherwise.
pub fn build_ranker(cfg: &RankingConfig) -> DynRanker {
    let Some(key) = cfg.api_key.clone() else {
        tracing::warn!(
            error = %RankingError::NotConfigured,
            "ranking service unavailable; digest will use the deterministic fallback"
        );
        return Arc::new(FallbackRanker::not_configured());
    };

    tracing::info!(model = %cfg.model, key_len = key.len(), "ranking service configured");
    match OpenAiProvider::new(cfg, key) {
        Ok(provider) => Arc::new(ServiceRanker::new(provider, cfg)),
        Err(error) => {
            tracing::warn!(%error, "could not build ranking client; using deterministic fallback");
            Arc::new(FallbackRanker::new(error))
        }
    }
}
