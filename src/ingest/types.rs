// src/ingest/types.rs
use async_trait::async_trait;

use crate::error::SourceError;

/// Provider-native record before normalization. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawCandidate {
    pub source: String, // provider name, e.g. "scrape", "search-api"
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
    pub cost: Option<String>,
    pub prerequisites: Option<String>,
}

impl RawCandidate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// A record with neither a title nor a link cannot be interpreted at all.
    pub fn is_interpretable(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.title) || present(&self.link)
    }
}

#[async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_candidates(&self) -> Result<Vec<RawCandidate>, SourceError>;
    fn name(&self) -> &'static str;
}
