// src/ingest/providers/http.rs
//! Shared GET helper: one request, explicit timeout, non-2xx mapped to an error.

use std::time::Duration;

use crate::error::SourceError;

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .timeout(timeout)
        .build()
        .map_err(|e| SourceError::Request(e.to_string()))
}

/// Send a prepared request and return the body text of a 2xx response.
pub(crate) async fn fetch_text(req: reqwest::RequestBuilder, provider: &str) -> Result<String, SourceError> {
    let resp = req.send().await.map_err(|e| {
        tracing::warn!(error = %e, provider, "source http error");
        SourceError::from_http(&e)
    })?;

    let status = resp.status();
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), provider, "source returned non-success status");
        return Err(SourceError::Status(status.as_u16()));
    }

    resp.text().await.map_err(|e| SourceError::from_http(&e))
}
