// src/notify/message.rs
use chrono::NaiveDate;

use super::RunOutcome;
use crate::config::NotifyConfig;

pub const EMPTY_SUBJECT: &str = "No new opportunities";
pub const ERROR_SUBJECT: &str = "[ERROR] Opportunity digest failed";
pub const UNAVAILABLE_FOOTER: &str = "Sources unavailable this run:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Digest,
    Empty,
    ErrorReport,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Digest => "digest",
            MessageKind::Empty => "empty",
            MessageKind::ErrorReport => "error-report",
        }
    }
}

/// A rendered plain-text mail, not yet addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub kind: MessageKind,
    pub subject: String,
    pub body: String,
}

/// Render the one message a run sends.
pub fn compose(outcome: &RunOutcome, cfg: &NotifyConfig, today: NaiveDate) -> OutgoingMessage {
    match outcome {
        RunOutcome::Delivered { digest, unavailable } => {
            let mut body = format!("{}\n\n{}", cfg.preamble, digest.render());
            if !unavailable.is_empty() {
                let names = unavailable.iter().map(ToString::to_string).collect::<Vec<_>>();
                body.push_str(&format!("\n\n{UNAVAILABLE_FOOTER} {}\n", names.join("; ")));
            }
            OutgoingMessage {
                kind: MessageKind::Digest,
                subject: format!("{} - {today}", cfg.subject_prefix),
                body,
            }
        }
        RunOutcome::EmptyResult => OutgoingMessage {
            kind: MessageKind::Empty,
            subject: format!("{EMPTY_SUBJECT} - {today}"),
            body: format!(
                "No relevant opportunities were found for \"{}\" this period.\n\
                 The search ran normally; there is nothing to rank.\n",
                cfg.subject_prefix
            ),
        },
        RunOutcome::StageFailed { stage, detail } => OutgoingMessage {
            kind: MessageKind::ErrorReport,
            subject: format!("{ERROR_SUBJECT} - {today}"),
            body: format!(
                "The opportunity digest run for \"{}\" failed before a digest could be produced.\n\n\
                 Stage: {stage}\n\
                 Detail: {detail}\n\
                 Date: {today}\n",
                cfg.subject_prefix
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::ingest::SourceUnavailable;
    use crate::notify::Stage;
    use crate::rank::Digest;

    fn cfg() -> NotifyConfig {
        NotifyConfig {
            subject_prefix: "Top AI Training Opportunities".into(),
            preamble: "Here are this period's picks:".into(),
            ..NotifyConfig::default()
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn digest_subject_has_date_and_body_has_preamble() {
        let msg = compose(
            &RunOutcome::delivered(Digest::Narrative("1. Course A".into())),
            &cfg(),
            day(),
        );
        assert_eq!(msg.subject, "Top AI Training Opportunities - 2026-10-16");
        assert_eq!(msg.body, "Here are this period's picks:\n\n1. Course A");
        assert_eq!(msg.kind, MessageKind::Digest);
    }

    #[test]
    fn degraded_sources_are_listed_under_the_digest() {
        let msg = compose(
            &RunOutcome::Delivered {
                digest: Digest::Narrative("1. Course A".into()),
                unavailable: vec![SourceUnavailable {
                    provider: "search-api",
                    error: SourceError::Status(503),
                }],
            },
            &cfg(),
            day(),
        );
        assert!(msg
            .body
            .ends_with("1. Course A\n\nSources unavailable this run: search-api: http status 503\n"));
        assert_eq!(msg.kind, MessageKind::Digest);
    }

    #[test]
    fn error_report_names_stage_and_detail() {
        let msg = compose(
            &RunOutcome::StageFailed {
                stage: Stage::Source,
                detail: "timeout".into(),
            },
            &cfg(),
            day(),
        );
        assert!(msg.subject.starts_with(ERROR_SUBJECT));
        assert!(msg.body.contains("Stage: source\n"));
        assert!(msg.body.contains("Detail: timeout\n"));
    }

    #[test]
    fn empty_result_has_its_own_subject() {
        let msg = compose(&RunOutcome::EmptyResult, &cfg(), day());
        assert_eq!(msg.subject, "No new opportunities - 2026-10-16");
        assert_eq!(msg.kind, MessageKind::Empty);
    }
}
