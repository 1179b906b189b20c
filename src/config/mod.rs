// src/config/mod.rs
//! Run configuration: an optional TOML file layered over profile defaults,
//! with secrets taken from the environment only.
//!
//! Lookup order for the file:
//! 1) explicit path (`--config`)
//! 2) `$DIGEST_CONFIG_PATH`
//! 3) `config/digest.toml` if it exists
//! 4) built-in defaults

pub mod profile;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
pub use profile::Profile;

pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/digest.toml";

/// Hard ceiling on candidates read per provider and per run.
pub const MAX_CANDIDATES: usize = 30;

const ENV_PROFILE: &str = "DIGEST_PROFILE";
const ENV_RECIPIENT: &str = "DIGEST_RECIPIENT";
const ENV_EMAIL_USER: &str = "EMAIL_USER";
const ENV_EMAIL_PASS: &str = "EMAIL_PASS";
const ENV_OPENAI_KEY: &str = "OPENAI_API_KEY";
const ENV_SEARCH_KEY: &str = "SEARCH_API_KEY";
const ENV_SMTP_HOST: &str = "SMTP_HOST";
const ENV_SMTP_PORT: &str = "SMTP_PORT";

pub fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.5735.133 Safari/537.36".to_string()
}
fn default_query_param() -> String {
    "q".to_string()
}
fn default_count_param() -> Option<String> {
    Some("num".to_string())
}
fn default_max_count() -> usize {
    10
}
fn default_results_path() -> String {
    "items".to_string()
}
fn default_title_field() -> String {
    "title".to_string()
}
fn default_link_field() -> String {
    "link".to_string()
}
fn default_snippet_field() -> String {
    "snippet".to_string()
}
fn default_scrape_endpoint() -> String {
    profile::DEFAULT_SEARCH_ENDPOINT.to_string()
}

// ------------------------------------------------------------
// Sources
// ------------------------------------------------------------

/// One configured provider. `kind` selects the strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    Scrape(ScrapeSource),
    SearchApi(SearchApiSource),
    Rss(RssSource),
    Static(StaticSource),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeSource {
    #[serde(default = "default_scrape_endpoint")]
    pub endpoint: String,
    pub query: String,
    #[serde(default = "default_query_param")]
    pub query_param: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub selectors: ResultSelectors,
}

/// CSS selectors for one repeated result block and the parts inside it.
/// Defaults match Bing's organic results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultSelectors {
    pub result: String,
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl Default for ResultSelectors {
    fn default() -> Self {
        Self {
            result: "li.b_algo".to_string(),
            title: "h2".to_string(),
            link: "a[href]".to_string(),
            snippet: "p".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchApiSource {
    pub endpoint: String,
    pub query: String,
    #[serde(default = "default_query_param")]
    pub query_param: String,
    /// Result-count hint parameter; the value sent is the candidate cap.
    #[serde(default = "default_count_param")]
    pub count_param: Option<String>,
    /// Largest count the API accepts (Google CSE: 10). The hint sent is `min(cap, max_count)`.
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    /// Send the API key as this query parameter (e.g. `key`, `api_key`).
    #[serde(default)]
    pub api_key_param: Option<String>,
    /// Or as this header (e.g. `Ocp-Apim-Subscription-Key`).
    #[serde(default)]
    pub api_key_header: Option<String>,
    #[serde(default)]
    pub extra_params: BTreeMap<String, String>,
    /// Dotted path to the result array, e.g. `items` or `webPages.value`.
    #[serde(default = "default_results_path")]
    pub results_path: String,
    #[serde(default = "default_title_field")]
    pub title_field: String,
    #[serde(default = "default_link_field")]
    pub link_field: String,
    #[serde(default = "default_snippet_field")]
    pub snippet_field: String,
    /// From `SEARCH_API_KEY`; never read from the file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssSource {
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticSource {
    #[serde(default)]
    pub entries: Vec<StaticEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub cost: Option<String>,
    pub prerequisites: Option<String>,
}

// ------------------------------------------------------------
// Ranking + notification
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Empty means "use the profile's prompt".
    pub system_prompt: String,
    pub instructions: String,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            timeout_secs: 30,
            system_prompt: String::new(),
            instructions: String::new(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS (SMTPS).
    #[default]
    Tls,
    /// Plain connect upgraded with STARTTLS before AUTH.
    StartTls,
}

impl SmtpSecurity {
    pub fn default_port(self) -> u16 {
        match self {
            SmtpSecurity::Tls => 465,
            SmtpSecurity::StartTls => 587,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub smtp_host: String,
    /// `None` picks the port matching `security`.
    pub smtp_port: Option<u16>,
    pub security: SmtpSecurity,
    pub recipient: Option<String>,
    pub subject_prefix: String,
    pub preamble: String,
    pub timeout_secs: u64,
    #[serde(skip)]
    pub sender: Option<String>,
    #[serde(skip)]
    pub secret: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: None,
            security: SmtpSecurity::Tls,
            recipient: None,
            subject_prefix: String::new(),
            preamble: String::new(),
            timeout_secs: 30,
            sender: None,
            secret: None,
        }
    }
}

impl NotifyConfig {
    pub fn port(&self) -> u16 {
        self.smtp_port.unwrap_or_else(|| self.security.default_port())
    }

    pub fn recipient(&self) -> &str {
        self.recipient.as_deref().unwrap_or_default()
    }
}

// ------------------------------------------------------------
// Top level
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub profile: Profile,
    pub sources: Vec<SourceSpec>,
    pub max_candidates: usize,
    pub source_timeout_secs: u64,
    pub ranking: RankingConfig,
    pub notify: NotifyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            sources: Vec::new(),
            max_candidates: MAX_CANDIDATES,
            source_timeout_secs: 15,
            ranking: RankingConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl AppConfig {
    /// Resolve the full configuration for one run.
    /// `profile` (from the command line) beats `DIGEST_PROFILE`, which beats the file.
    pub fn load(path: Option<&Path>, profile: Option<Profile>) -> Result<Self, ConfigError> {
        let mut cfg = match resolve_path(path)? {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };

        if let Some(p) = profile {
            cfg.profile = p;
        } else if let Some(p) = env_non_blank(ENV_PROFILE) {
            cfg.profile = p.parse()?;
        }

        cfg.apply_env()?;
        cfg.finalize()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&data, path)
    }

    pub fn from_toml_str(data: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(data).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Pull secrets and deployment overrides from the environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.notify.sender = env_non_blank(ENV_EMAIL_USER);
        self.notify.secret = env_secret(ENV_EMAIL_PASS);
        self.ranking.api_key = env_non_blank(ENV_OPENAI_KEY);

        let search_key = env_non_blank(ENV_SEARCH_KEY);
        for source in &mut self.sources {
            if let SourceSpec::SearchApi(api) = source {
                api.api_key = search_key.clone();
            }
        }

        if let Some(r) = env_non_blank(ENV_RECIPIENT) {
            self.notify.recipient = Some(r);
        }
        if let Some(h) = env_non_blank(ENV_SMTP_HOST) {
            self.notify.smtp_host = h;
        }
        if let Some(p) = env_non_blank(ENV_SMTP_PORT) {
            let port = p.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_SMTP_PORT,
                value: p.clone(),
            })?;
            self.notify.smtp_port = Some(port);
        }
        Ok(())
    }

    /// Fill profile defaults, clamp numeric knobs and check required fields.
    pub fn finalize(&mut self) -> Result<(), ConfigError> {
        let profile = self.profile;

        if self.sources.is_empty() {
            self.sources = profile.default_sources();
        }

        self.max_candidates = self.max_candidates.clamp(1, MAX_CANDIDATES);
        self.source_timeout_secs = self.source_timeout_secs.max(1);

        let r = &mut self.ranking;
        if !r.temperature.is_finite() || !(0.0..=2.0).contains(&r.temperature) {
            r.temperature = RankingConfig::default().temperature;
        }
        r.max_tokens = r.max_tokens.max(1);
        r.timeout_secs = r.timeout_secs.max(1);
        if r.system_prompt.trim().is_empty() {
            r.system_prompt = profile.system_prompt().to_string();
        }
        if r.instructions.trim().is_empty() {
            r.instructions = profile.instructions().to_string();
        }

        let n = &mut self.notify;
        n.timeout_secs = n.timeout_secs.max(1);
        if n.subject_prefix.trim().is_empty() {
            n.subject_prefix = profile.subject_prefix().to_string();
        }
        if n.preamble.trim().is_empty() {
            n.preamble = profile.preamble().to_string();
        }
        match n.recipient.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => n.recipient = Some(r.to_string()),
            _ => return Err(ConfigError::MissingRecipient),
        }

        Ok(())
    }
}

fn resolve_path(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    let requested = explicit
        .map(Path::to_path_buf)
        .or_else(|| env_non_blank(ENV_CONFIG_PATH).map(PathBuf::from));

    if let Some(p) = requested {
        if p.exists() {
            return Ok(Some(p));
        }
        return Err(ConfigError::NotFound { path: p });
    }

    let default = PathBuf::from(DEFAULT_CONFIG_PATH);
    Ok(default.exists().then_some(default))
}

/// Like `env_non_blank`, but the value is passed through untrimmed.
fn env_secret(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Blank values count as unset.
pub(crate) fn env_non_blank(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
