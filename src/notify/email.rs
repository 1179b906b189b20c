// src/notify/email.rs
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use std::time::Duration;

use super::message::OutgoingMessage;
use super::{MailTransport, SenderCredentials};
use crate::config::{NotifyConfig, SmtpSecurity};
use crate::error::{TransportError, TransportFailure};

/// Authenticated SMTP over implicit TLS (465) or STARTTLS (587).
/// A fresh session is opened per message; a run sends at most one.
pub struct SmtpMailer {
    host: String,
    port: u16,
    security: SmtpSecurity,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn from_config(cfg: &NotifyConfig) -> Self {
        Self {
            host: cfg.smtp_host.clone(),
            port: cfg.port(),
            security: cfg.security,
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    fn transport(&self, creds: &SenderCredentials) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
        let builder = match self.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host),
            SmtpSecurity::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host),
        }
        .map_err(|e| TransportError::new(TransportFailure::ConnectFailed, e.to_string()))?;

        Ok(builder
            .port(self.port)
            .credentials(Credentials::new(creds.user.clone(), creds.secret.clone()))
            .timeout(Some(self.timeout))
            .build())
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(
        &self,
        creds: &SenderCredentials,
        recipient: &str,
        msg: &OutgoingMessage,
    ) -> Result<(), TransportError> {
        let from = creds.user.parse::<Mailbox>().map_err(|e| {
            TransportError::new(TransportFailure::Other, format!("invalid sender address: {e}"))
        })?;
        let to = recipient.parse::<Mailbox>().map_err(|e| {
            TransportError::new(
                TransportFailure::RecipientRejected,
                format!("invalid recipient address: {e}"),
            )
        })?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(msg.subject.clone())
            .header(header::ContentType::TEXT_PLAIN)
            .body(msg.body.clone())
            .map_err(|e| TransportError::new(TransportFailure::Other, format!("build email: {e}")))?;

        tracing::info!(host = %self.host, port = self.port, "connecting to mail server");
        let mailer = self.transport(creds)?;
        mailer.send(email).await.map_err(|e| classify(&e))?;
        Ok(())
    }
}

fn classify(err: &lettre::transport::smtp::Error) -> TransportError {
    let kind = match err.status() {
        Some(code) => classify_reply_code(&code.to_string()),
        None if err.is_client() || err.is_response() => TransportFailure::Other,
        None => TransportFailure::ConnectFailed,
    };
    TransportError::new(kind, err.to_string())
}

/// Bucket an SMTP reply code for diagnostics.
pub fn classify_reply_code(code: &str) -> TransportFailure {
    match code {
        "530" | "534" | "535" | "538" => TransportFailure::AuthRejected,
        "550" | "551" | "553" => TransportFailure::RecipientRejected,
        "421" => TransportFailure::ConnectFailed,
        _ => TransportFailure::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::message::MessageKind;

    #[test]
    fn reply_codes_are_bucketed() {
        assert_eq!(classify_reply_code("535"), TransportFailure::AuthRejected);
        assert_eq!(classify_reply_code("550"), TransportFailure::RecipientRejected);
        assert_eq!(classify_reply_code("421"), TransportFailure::ConnectFailed);
        assert_eq!(classify_reply_code("552"), TransportFailure::Other);
    }

    #[tokio::test]
    async fn bad_recipient_fails_before_connecting() {
        let mailer = SmtpMailer::from_config(&NotifyConfig::default());
        let creds = SenderCredentials {
            user: "sender@example.test".into(),
            secret: "pw".into(),
        };
        let msg = OutgoingMessage {
            kind: MessageKind::Empty,
            subject: "s".into(),
            body: "b".into(),
        };
        let err = mailer.send(&creds, "not an address", &msg).await.unwrap_err();
        assert_eq!(err.kind, TransportFailure::RecipientRejected);
    }
}
