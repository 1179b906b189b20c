// src/normalize.rs
//! Canonical `Opportunity` shape and the total mapping from provider records.
//!
//! Every field is always populated: absent or blank upstream values become a
//! fixed sentinel string, so downstream rendering never has to branch on
//! missing data.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ingest::types::RawCandidate;

pub const NO_TITLE: &str = "No title found";
pub const NO_LINK: &str = "No link";
pub const NO_DESCRIPTION: &str = "No description available";
pub const COST_VARIES: &str = "Varies (Check link)";
pub const PREREQUISITES_UNKNOWN: &str = "Check link for details";

const TITLE_MAX_CHARS: usize = 300;
const DESCRIPTION_MAX_CHARS: usize = 1500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub title: String,
    pub link: String,
    pub description: String,
    pub cost: String,
    pub prerequisites: String,
}

impl From<RawCandidate> for Opportunity {
    fn from(raw: RawCandidate) -> Self {
        Self {
            title: or_sentinel(raw.title.as_deref(), TITLE_MAX_CHARS, NO_TITLE),
            link: raw
                .link
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| NO_LINK.to_string()),
            description: or_sentinel(raw.snippet.as_deref(), DESCRIPTION_MAX_CHARS, NO_DESCRIPTION),
            cost: or_sentinel(raw.cost.as_deref(), TITLE_MAX_CHARS, COST_VARIES),
            prerequisites: or_sentinel(
                raw.prerequisites.as_deref(),
                DESCRIPTION_MAX_CHARS,
                PREREQUISITES_UNKNOWN,
            ),
        }
    }
}

/// Map a whole batch, preserving discovery order.
pub fn normalize_all(raw: Vec<RawCandidate>) -> Vec<Opportunity> {
    raw.into_iter().map(Opportunity::from).collect()
}

fn or_sentinel(value: Option<&str>, cap: usize, sentinel: &str) -> String {
    let cleaned = value.map(|v| normalize_text(v, cap)).unwrap_or_default();
    if cleaned.is_empty() {
        sentinel.to_string()
    } else {
        cleaned
    }
}

/// Clean scraped text: decode entities, drop tags, fold typographic quotes,
/// collapse whitespace and cap the length (in chars).
pub fn normalize_text(s: &str, max_chars: usize) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-z][^>]*>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > max_chars {
        out = out.chars().take(max_chars).collect::<String>().trim_end().to_string();
    }
    out
}
