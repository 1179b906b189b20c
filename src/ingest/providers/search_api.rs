// src/ingest/providers/search_api.rs
//! Structured JSON search API (Google CSE, SerpAPI, Bing Web Search, ...).
//! Entries are trusted: every object in the result array becomes a candidate,
//! missing fields are left for the normalizer to fill.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::http::{build_client, fetch_text};
use crate::config::{default_user_agent, SearchApiSource};
use crate::error::SourceError;
use crate::ingest::types::{RawCandidate, SourceProvider};

const NAME: &str = "search-api";

pub struct SearchApiProvider {
    cfg: SearchApiSource,
    cap: usize,
    client: reqwest::Client,
}

impl SearchApiProvider {
    pub fn new(cfg: &SearchApiSource, cap: usize, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            cfg: cfg.clone(),
            cap,
            client: build_client(&default_user_agent(), timeout)?,
        })
    }

    fn count_hint(&self) -> usize {
        self.cap.min(self.cfg.max_count).max(1)
    }

    fn build_request(&self) -> Result<reqwest::RequestBuilder, SourceError> {
        let cfg = &self.cfg;
        let needs_key = cfg.api_key_param.is_some() || cfg.api_key_header.is_some();
        let key = cfg.api_key.as_deref();
        if needs_key && key.is_none() {
            return Err(SourceError::MissingCredential(cfg.endpoint.clone()));
        }

        let mut params: Vec<(String, String)> = vec![(cfg.query_param.clone(), cfg.query.clone())];
        if let Some(count) = &cfg.count_param {
            params.push((count.clone(), self.count_hint().to_string()));
        }
        for (k, v) in &cfg.extra_params {
            params.push((k.clone(), v.clone()));
        }
        if let (Some(param), Some(key)) = (&cfg.api_key_param, key) {
            params.push((param.clone(), key.to_string()));
        }

        let mut req = self.client.get(&cfg.endpoint).query(&params);
        if let (Some(header), Some(key)) = (&cfg.api_key_header, key) {
            req = req.header(header.as_str(), key);
        }
        Ok(req)
    }
}

#[async_trait]
impl SourceProvider for SearchApiProvider {
    async fn fetch_candidates(&self) -> Result<Vec<RawCandidate>, SourceError> {
        let req = self.build_request()?;
        let body = fetch_text(req, NAME).await?;
        let out = parse_results(&body, &self.cfg, self.cap)?;
        tracing::info!(provider = NAME, found = out.len(), "search api results");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

/// Map the JSON payload to candidates. An object without the result array is
/// an empty result (APIs omit it when nothing matched); anything else that does
/// not fit is malformed.
pub fn parse_results(body: &str, cfg: &SearchApiSource, cap: usize) -> Result<Vec<RawCandidate>, SourceError> {
    let root: Value = serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;
    if !root.is_object() {
        return Err(SourceError::Malformed("top-level JSON is not an object".to_string()));
    }

    let Some(node) = lookup_path(&root, &cfg.results_path) else {
        tracing::debug!(provider = NAME, path = %cfg.results_path, "result array absent; treating as empty");
        return Ok(Vec::new());
    };
    let items = node
        .as_array()
        .ok_or_else(|| SourceError::Malformed(format!("`{}` is not an array", cfg.results_path)))?;

    Ok(items
        .iter()
        .take(cap)
        .map(|item| RawCandidate {
            title: string_field(item, &cfg.title_field),
            link: string_field(item, &cfg.link_field),
            snippet: string_field(item, &cfg.snippet_field),
            ..RawCandidate::new(NAME)
        })
        .collect())
}

fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|seg| !seg.is_empty())
        .try_fold(root, |node, seg| node.get(seg))
}

fn string_field(item: &Value, field: &str) -> Option<String> {
    match item.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
