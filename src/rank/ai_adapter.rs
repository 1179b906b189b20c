//! LLM provider abstraction for the ranking service.
//!
//! A provider does exactly one remote call per run. Any failure is returned
//! as a `RankingError` and the caller falls back; there is no retry and no
//! caching here.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;
use crate::error::RankingError;
use crate::normalize::Opportunity;

/// Only the first entries go into the prompt; the narrative covers at most this many.
pub const MAX_PROMPT_ENTRIES: usize = 10;

pub type Completion<'a> = Pin<Box<dyn Future<Output = Result<String, RankingError>> + Send + 'a>>;

/// Low-level provider: does a *real* remote call (or pretends to, in tests).
pub trait Provider: Send + Sync + 'static {
    fn complete<'a>(&'a self, system: &'a str, prompt: &'a str) -> Completion<'a>;
    fn name(&self) -> &'static str;
}

/// Build the user prompt: instructions, then one block per opportunity.
pub fn build_prompt(instructions: &str, opportunities: &[Opportunity]) -> String {
    let mut prompt = String::with_capacity(256 + opportunities.len() * 256);
    prompt.push_str(instructions.trim());
    prompt.push_str("\n\n");
    for opp in opportunities.iter().take(MAX_PROMPT_ENTRIES) {
        prompt.push_str(&format!(
            "Title: {}\nLink: {}\nDescription: {}\n\n",
            opp.title, opp.link, opp.description
        ));
    }
    prompt
}

// ------------------------------------------------------------
// OpenAI-compatible chat completions
// ------------------------------------------------------------

pub struct OpenAiProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(cfg: &RankingConfig, api_key: String) -> Result<Self, RankingError> {
        let timeout = Duration::from_secs(cfg.timeout_secs);
        let http = reqwest::Client::builder()
            .user_agent(concat!("opportunity-digest/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout.min(Duration::from_secs(4)))
            .timeout(timeout)
            .build()
            .map_err(|e| RankingError::Request(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key,
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        })
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}
#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
}
#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}
#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}
#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

impl Provider for OpenAiProvider {
    fn complete<'a>(&'a self, system: &'a str, prompt: &'a str) -> Completion<'a> {
        Box::pin(async move {
            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: system,
                    },
                    Msg {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            let resp = self
                .http
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
                .map_err(|e| RankingError::Request(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(RankingError::Status(status.as_u16()));
            }

            let body: Resp = resp
                .json()
                .await
                .map_err(|e| RankingError::Malformed(e.to_string()))?;
            let content = body
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| RankingError::Malformed("no choices".to_string()))?;
            if content.trim().is_empty() {
                return Err(RankingError::Malformed("empty content".to_string()));
            }
            Ok(content)
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ------------------------------------------------------------
// Mock
// ------------------------------------------------------------

/// Canned provider for tests and local runs. Counts how often it was asked.
pub struct MockProvider {
    reply: Result<String, RankingError>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: RankingError) -> Self {
        Self {
            reply: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Provider for MockProvider {
    fn complete<'a>(&'a self, _system: &'a str, _prompt: &'a str) -> Completion<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let out = self.reply.clone();
        Box::pin(async move { out })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
