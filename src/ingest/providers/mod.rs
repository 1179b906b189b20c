// src/ingest/providers/mod.rs
pub(crate) mod http;
pub mod rss;
pub mod scrape;
pub mod search_api;
pub mod static_list;
