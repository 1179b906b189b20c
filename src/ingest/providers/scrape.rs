// src/ingest/providers/scrape.rs
//! Search-results page scraper. Each repeated result block is extracted on
//! its own; a block that yields neither a heading nor an anchor is skipped
//! while the rest of the page is still used.

use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use super::http::{build_client, fetch_text};
use crate::config::{ResultSelectors, ScrapeSource};
use crate::error::SourceError;
use crate::ingest::types::{RawCandidate, SourceProvider};

const NAME: &str = "scrape";

/// Compiled selectors for one result layout.
#[derive(Debug, Clone)]
pub struct ResultLayout {
    result: Selector,
    title: Selector,
    link: Selector,
    snippet: Selector,
}

impl ResultLayout {
    pub fn compile(sel: &ResultSelectors) -> Result<Self, SourceError> {
        Ok(Self {
            result: parse_selector(&sel.result)?,
            title: parse_selector(&sel.title)?,
            link: parse_selector(&sel.link)?,
            snippet: parse_selector(&sel.snippet)?,
        })
    }
}

fn parse_selector(s: &str) -> Result<Selector, SourceError> {
    Selector::parse(s).map_err(|e| SourceError::InvalidSelector {
        selector: s.to_string(),
        message: format!("{e:?}"),
    })
}

pub struct ScrapeProvider {
    endpoint: String,
    query: String,
    query_param: String,
    layout: ResultLayout,
    cap: usize,
    client: reqwest::Client,
}

impl ScrapeProvider {
    pub fn new(cfg: &ScrapeSource, cap: usize, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            endpoint: cfg.endpoint.clone(),
            query: cfg.query.clone(),
            query_param: cfg.query_param.clone(),
            layout: ResultLayout::compile(&cfg.selectors)?,
            cap,
            client: build_client(&cfg.user_agent, timeout)?,
        })
    }
}

#[async_trait]
impl SourceProvider for ScrapeProvider {
    async fn fetch_candidates(&self) -> Result<Vec<RawCandidate>, SourceError> {
        let req = self
            .client
            .get(&self.endpoint)
            .query(&[(self.query_param.as_str(), self.query.as_str())]);
        let body = fetch_text(req, NAME).await?;

        let base = Url::parse(&self.endpoint).ok();
        let out = parse_results(&body, &self.layout, base.as_ref(), self.cap);
        tracing::info!(provider = NAME, found = out.len(), "scraped search results");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

/// Extract up to `cap` result blocks from an HTML page.
pub fn parse_results(html: &str, layout: &ResultLayout, base: Option<&Url>, cap: usize) -> Vec<RawCandidate> {
    let doc = Html::parse_document(html);
    let mut out = Vec::new();

    for block in doc.select(&layout.result).take(cap) {
        let candidate = RawCandidate {
            title: first_text(block, &layout.title),
            link: first_href(block, &layout.link, base),
            snippet: first_text(block, &layout.snippet),
            ..RawCandidate::new(NAME)
        };
        if !candidate.is_interpretable() {
            tracing::debug!(provider = NAME, "skipping result block without title or link");
            continue;
        }
        out.push(candidate);
    }
    out
}

fn first_text(block: ElementRef<'_>, sel: &Selector) -> Option<String> {
    let text = block.select(sel).next()?.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn first_href(block: ElementRef<'_>, sel: &Selector, base: Option<&Url>) -> Option<String> {
    let href = block.select(sel).next()?.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    match Url::parse(href) {
        Ok(abs) => Some(abs.to_string()),
        Err(_) => base
            .and_then(|b| b.join(href).ok())
            .map(|u| u.to_string())
            .or_else(|| Some(href.to_string())),
    }
}
