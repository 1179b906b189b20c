// src/config/profile.rs
//! Built-in search profiles. A profile supplies the defaults a config file
//! may leave out: sources, mail wording and the ranking prompt.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ResultSelectors, ScrapeSource, SourceSpec};
use crate::error::ConfigError;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.bing.com/search";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// AI leadership / medical imaging courses.
    #[default]
    Careers,
    /// Epilepsy neurotechnology literature.
    Papers,
}

impl Profile {
    pub fn default_query(self) -> &'static str {
        match self {
            Profile::Careers => "AI leadership OR medical imaging site:linkedin.com/learning",
            Profile::Papers => {
                "(epilepsy OR seizure EEG OR MRI OR MEG OR PET OR AI OR Machine learning) site:scholar.google.com"
            }
        }
    }

    pub fn default_sources(self) -> Vec<SourceSpec> {
        vec![SourceSpec::Scrape(ScrapeSource {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            query: self.default_query().to_string(),
            query_param: "q".to_string(),
            user_agent: super::default_user_agent(),
            selectors: ResultSelectors::default(),
        })]
    }

    pub fn subject_prefix(self) -> &'static str {
        match self {
            Profile::Careers => "Top AI Training Opportunities",
            Profile::Papers => "New Epilepsy Neurotechnology Papers",
        }
    }

    pub fn preamble(self) -> &'static str {
        match self {
            Profile::Careers => {
                "Here are the top AI & medical imaging training opportunities from LinkedIn Learning and other sources:"
            }
            Profile::Papers => "Here are the most relevant recent papers on epilepsy neurotechnology:",
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            Profile::Careers => "You summarize AI training opportunities.",
            Profile::Papers => "You summarize research papers for a clinical neuroscience audience.",
        }
    }

    pub fn instructions(self) -> &'static str {
        match self {
            Profile::Careers => {
                "You are an expert career advisor. Analyze and rank the following AI leadership and \
                 medical imaging course opportunities for career advancement. Summarize the top 5: \
                 for each give the title, a brief summary, why it is relevant, and why it is valuable \
                 (mention cost and format when known)."
            }
            Profile::Papers => {
                "You are an expert in epilepsy neurotechnology. Analyze and rank the following papers. \
                 Summarize the top 5: for each give the title, a brief summary, why it is relevant, \
                 and what makes it valuable."
            }
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Careers => f.write_str("careers"),
            Profile::Papers => f.write_str("papers"),
        }
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "careers" | "courses" => Ok(Profile::Careers),
            "papers" | "neurotech" => Ok(Profile::Papers),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}
