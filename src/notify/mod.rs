// src/notify/mod.rs
//! Notifier: exactly one message per run, chosen by the `RunOutcome`.
//!
//! Failures inside the notifier are returned to the caller and never turned
//! into a second message.

pub mod email;
pub mod message;

use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::fmt;

use crate::config::NotifyConfig;
use crate::error::{NotifyError, TransportError};
use crate::ingest::SourceUnavailable;
use crate::notify::message::{compose, OutgoingMessage};
use crate::rank::Digest;

/// Pipeline stage names used in error reports and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Source,
    Notify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Source => f.write_str("source"),
            Stage::Notify => f.write_str("notify"),
        }
    }
}

/// How a run concluded, before notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// `unavailable` lists providers that failed while others still delivered.
    Delivered {
        digest: Digest,
        unavailable: Vec<SourceUnavailable>,
    },
    EmptyResult,
    StageFailed { stage: Stage, detail: String },
}

impl RunOutcome {
    pub fn delivered(digest: Digest) -> Self {
        RunOutcome::Delivered {
            digest,
            unavailable: Vec::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Delivered { .. } => "delivered",
            RunOutcome::EmptyResult => "empty",
            RunOutcome::StageFailed { .. } => "stage-failed",
        }
    }
}

/// Sender identity + secret. Both or nothing.
#[derive(Clone, PartialEq, Eq)]
pub struct SenderCredentials {
    pub user: String,
    pub secret: String,
}

impl SenderCredentials {
    /// The secret is used byte for byte; trimming only decides whether it is blank.
    pub fn resolve(cfg: &NotifyConfig) -> Result<Self, NotifyError> {
        let user = cfg.sender.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        let secret = cfg.secret.clone().filter(|s| !s.trim().is_empty());
        match (user, secret) {
            (Some(user), Some(secret)) => Ok(Self { user, secret }),
            _ => Err(NotifyError::CredentialsMissing),
        }
    }
}

impl fmt::Debug for SenderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderCredentials")
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        creds: &SenderCredentials,
        recipient: &str,
        msg: &OutgoingMessage,
    ) -> Result<(), TransportError>;
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "digest_notifications_total",
            "Notification attempts by message kind and result."
        );
    });
}

enum Mode {
    Send(Box<dyn MailTransport>),
    /// Print the composed message instead of sending it.
    Preview,
}

pub struct Notifier<'a> {
    cfg: &'a NotifyConfig,
    mode: Mode,
}

impl<'a> Notifier<'a> {
    pub fn new(cfg: &'a NotifyConfig, transport: Box<dyn MailTransport>) -> Self {
        Self {
            cfg,
            mode: Mode::Send(transport),
        }
    }

    pub fn preview(cfg: &'a NotifyConfig) -> Self {
        Self {
            cfg,
            mode: Mode::Preview,
        }
    }

    pub async fn deliver(&self, outcome: &RunOutcome, today: NaiveDate) -> Result<(), NotifyError> {
        ensure_metrics_described();
        let msg = compose(outcome, self.cfg, today);
        let kind = msg.kind.as_str();

        let transport = match &self.mode {
            Mode::Preview => {
                println!("To: {}\nSubject: {}\n\n{}", self.cfg.recipient(), msg.subject, msg.body);
                tracing::info!(kind, "preview only; nothing sent");
                return Ok(());
            }
            Mode::Send(t) => t,
        };

        let creds = SenderCredentials::resolve(self.cfg).inspect_err(|_| {
            counter!("digest_notifications_total", "kind" => kind, "result" => "no-credentials").increment(1);
        })?;

        match transport.send(&creds, self.cfg.recipient(), &msg).await {
            Ok(()) => {
                counter!("digest_notifications_total", "kind" => kind, "result" => "sent").increment(1);
                tracing::info!(kind, subject = %msg.subject, "email sent");
                Ok(())
            }
            Err(e) => {
                counter!("digest_notifications_total", "kind" => kind, "result" => "failed").increment(1);
                Err(NotifyError::Transport(e))
            }
        }
    }
}
