//! Error taxonomy shared by the pipeline stages.
//!
//! Stage errors are plain `thiserror` enums; the binary wraps whatever escapes
//! with `anyhow` context.

use std::path::PathBuf;

/// Why a source provider could not deliver candidates.
///
/// `Display` output doubles as the `detail` string of a failed source stage,
/// so keep the messages short and operator-readable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("timeout")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("http status {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("missing API credential for {0}")]
    MissingCredential(String),
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

impl SourceError {
    /// Map a reqwest failure onto the taxonomy (timeout first, it is the most specific).
    pub fn from_http(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Status(status.as_u16())
        } else if err.is_decode() || err.is_body() {
            SourceError::Malformed(err.to_string())
        } else {
            SourceError::Request(err.to_string())
        }
    }
}

/// Failure of the external ranking service. Always recovered by the ranker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankingError {
    #[error("ranking service not configured (missing API key)")]
    NotConfigured,
    #[error("ranking request failed: {0}")]
    Request(String),
    #[error("ranking service returned http {0}")]
    Status(u16),
    #[error("ranking response malformed: {0}")]
    Malformed(String),
}

/// Transport-level mail failure classes. None of them is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    AuthRejected,
    ConnectFailed,
    RecipientRejected,
    Other,
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransportFailure::AuthRejected => "authentication rejected",
            TransportFailure::ConnectFailed => "connection failed",
            TransportFailure::RecipientRejected => "recipient refused",
            TransportFailure::Other => "transport error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct TransportError {
    pub kind: TransportFailure,
    pub detail: String,
}

impl TransportError {
    pub fn new(kind: TransportFailure, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Errors raised inside the notifier. These cannot be mailed and surface
/// through logs and the process exit status instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("missing email credentials (EMAIL_USER and EMAIL_PASS must both be set)")]
    CredentialsMissing,
    #[error("email delivery failed: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {path:?} does not exist")]
    NotFound { path: PathBuf },
    #[error("reading config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("unknown profile `{0}` (expected `careers` or `papers`)")]
    UnknownProfile(String),
    #[error("no recipient configured (set notify.recipient or DIGEST_RECIPIENT)")]
    MissingRecipient,
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_detail_is_bare_word() {
        assert_eq!(SourceError::Timeout.to_string(), "timeout");
    }

    #[test]
    fn transport_error_display_includes_class() {
        let e = TransportError::new(TransportFailure::AuthRejected, "535 5.7.8 bad creds");
        assert_eq!(e.to_string(), "authentication rejected: 535 5.7.8 bad creds");
        let n: NotifyError = e.into();
        assert!(n.to_string().starts_with("email delivery failed"));
    }
}
