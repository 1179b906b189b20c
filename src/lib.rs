// src/lib.rs
// Public library surface for the binary and the integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod normalize;
pub mod notify;
pub mod pipeline;
pub mod rank;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::{AppConfig, Profile};
pub use crate::normalize::Opportunity;
pub use crate::notify::{Notifier, RunOutcome, Stage};
pub use crate::pipeline::{Pipeline, RunReport};
pub use crate::rank::{build_ranker, Digest, Ranker};
