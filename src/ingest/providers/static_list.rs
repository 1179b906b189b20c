// src/ingest/providers/static_list.rs
use async_trait::async_trait;

use crate::config::{StaticEntry, StaticSource};
use crate::error::SourceError;
use crate::ingest::types::{RawCandidate, SourceProvider};

const NAME: &str = "static";

/// Fixed list of known opportunities from the config file. Never fails.
pub struct StaticListProvider {
    entries: Vec<StaticEntry>,
    cap: usize,
}

impl StaticListProvider {
    pub fn new(cfg: &StaticSource, cap: usize) -> Self {
        Self {
            entries: cfg.entries.clone(),
            cap,
        }
    }
}

#[async_trait]
impl SourceProvider for StaticListProvider {
    async fn fetch_candidates(&self) -> Result<Vec<RawCandidate>, SourceError> {
        let out: Vec<RawCandidate> = self
            .entries
            .iter()
            .map(|e| RawCandidate {
                title: e.title.clone(),
                link: e.link.clone(),
                snippet: e.description.clone(),
                cost: e.cost.clone(),
                prerequisites: e.prerequisites.clone(),
                ..RawCandidate::new(NAME)
            })
            .filter(RawCandidate::is_interpretable)
            .take(self.cap)
            .collect();
        tracing::info!(provider = NAME, found = out.len(), "static entries");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
