use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::sendlog::{SendCriteria, SendLog, SendRecord};

pub const DEFAULT_SUBJECT: &str = "Welcome \u{2014} next steps for our work together";

/// Delivers one plain-text email and returns the provider's message id.
pub trait Mailer {
    fn send(&self, sender: &str, recipient: &str, subject: &str, body: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct OnboardingRequest {
    pub recipient: String,
    pub sender: String,
    pub first_name: String,
    pub sender_name: String,
    pub scheduling_link: String,
    pub subject: String,
    pub body: Option<String>,
    pub body_file: Option<PathBuf>,
    pub template_file: Option<PathBuf>,
    pub template_version: String,
    pub duplicate_window_hours: u64,
    pub allow_duplicate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Skipped,
    Sent { message_id: String },
}

impl OnboardingRequest {
    pub fn criteria(&self) -> SendCriteria {
        SendCriteria {
            recipient: self.recipient.clone(),
            subject: self.subject.clone(),
            sender: self.sender.clone(),
            template_version: self.template_version.clone(),
        }
    }

    /// Body file, then inline body, then the onboarding template.
    pub fn resolve_body(&self) -> Result<String> {
        if let Some(path) = &self.body_file {
            debug!("Loading email body from {}", path.display());
            return fs::read_to_string(path)
                .with_context(|| format!("Failed to read body file {}", path.display()));
        }
        if let Some(body) = &self.body {
            debug!("Using provided email body");
            return Ok(body.clone());
        }
        debug!("Building email from template");
        build_onboarding_body(
            &self.first_name,
            &self.scheduling_link,
            &self.sender_name,
            self.template_file.as_deref(),
        )
    }
}

/// Send the onboarding email unless a matching one was logged inside the
/// duplicate window, and record the send.
pub fn send_onboarding<M: Mailer + ?Sized>(
    request: &OnboardingRequest,
    log: &mut dyn SendLog,
    mailer: &M,
) -> Result<SendOutcome> {
    info!("Starting onboarding email send to {}", request.recipient);
    let body = request.resolve_body()?;
    let criteria = request.criteria();

    if !request.allow_duplicate {
        let window = i64::try_from(request.duplicate_window_hours)
            .ok()
            .and_then(Duration::try_hours)
            .context("Duplicate window is too large")?;
        if log.recent_matches(&criteria, window)? {
            warn!(
                "Duplicate found: email to {} sent within the last {} hours",
                request.recipient, request.duplicate_window_hours
            );
            return Ok(SendOutcome::Skipped);
        }
    }

    let message_id = mailer.send(&request.sender, &request.recipient, &request.subject, &body)?;
    log.append(&SendRecord::new(&criteria, &message_id, Utc::now()))
        .context("Email was sent but could not be logged")?;
    info!("Completed successfully, message ID: {}", message_id);
    Ok(SendOutcome::Sent { message_id })
}

pub fn scheduling_line(scheduling_link: &str) -> String {
    if scheduling_link.is_empty() {
        "I'll follow up with a kickoff time".to_string()
    } else {
        format!("We'll schedule our kickoff call ({})", scheduling_link)
    }
}

/// Fill the template at `template_path` when it exists, else use the built-in body.
pub fn build_onboarding_body(
    first_name: &str,
    scheduling_link: &str,
    sender_name: &str,
    template_path: Option<&Path>,
) -> Result<String> {
    if let Some(path) = template_path.filter(|p| p.exists()) {
        debug!("Loading template from {}", path.display());
        let template = fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?;
        return Ok(template
            .replace("{first_name}", first_name)
            .replace("{sender_name}", sender_name)
            .replace("{scheduling_line}", &scheduling_line(scheduling_link)));
    }

    Ok([
        format!("Hi {},", first_name),
        String::new(),
        "Thanks for signing up to work together \u{2014} I'm excited to get started.".into(),
        String::new(),
        "Here's what happens next:".into(),
        "- I'll review your intake details and draft an initial plan".into(),
        format!("- {}", scheduling_line(scheduling_link)),
        "- I'll share a shared workspace and any prep materials".into(),
        String::new(),
        "If you have any immediate questions, just reply here.".into(),
        String::new(),
        format!("Best,\n{}", sender_name),
    ]
    .join("\n"))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::sendlog::SqliteSendLog;

    #[derive(Default)]
    struct RecordingMailer {
        sent: RefCell<Vec<(String, String, String, String)>>,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, sender: &str, recipient: &str, subject: &str, body: &str) -> Result<String> {
            let mut sent = self.sent.borrow_mut();
            sent.push((sender.into(), recipient.into(), subject.into(), body.into()));
            Ok(format!("msg-{}", sent.len()))
        }
    }

    struct FailingMailer;

    impl Mailer for FailingMailer {
        fn send(&self, _: &str, _: &str, _: &str, _: &str) -> Result<String> {
            anyhow::bail!("Gmail unavailable")
        }
    }

    fn request() -> OnboardingRequest {
        OnboardingRequest {
            recipient: "client@example.com".into(),
            sender: "coach@example.com".into(),
            first_name: "Sam".into(),
            sender_name: "Jane".into(),
            scheduling_link: String::new(),
            subject: DEFAULT_SUBJECT.into(),
            body: None,
            body_file: None,
            template_file: None,
            template_version: "default-v1".into(),
            duplicate_window_hours: 24,
            allow_duplicate: false,
        }
    }

    #[test]
    fn default_body_without_link() {
        let body = build_onboarding_body("Sam", "", "Jane", None).unwrap();
        assert!(body.starts_with("Hi Sam,\n\nThanks for signing up"));
        assert!(body.contains("- I'll follow up with a kickoff time\n"));
        assert!(body.ends_with("Best,\nJane"));
    }

    #[test]
    fn default_body_with_link() {
        let body = build_onboarding_body("Sam", "https://cal.example/jane", "Jane", None).unwrap();
        assert!(body.contains("- We'll schedule our kickoff call (https://cal.example/jane)\n"));
        assert!(!body.contains("follow up with a kickoff time"));
    }

    #[test]
    fn template_placeholders_are_filled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.txt");
        fs::write(&path, "Dear {first_name}: {scheduling_line}. {first_name}! -- {sender_name}").unwrap();

        let body = build_onboarding_body("Sam", "https://cal.example", "Jane", Some(path.as_path())).unwrap();
        assert_eq!(
            body,
            "Dear Sam: We'll schedule our kickoff call (https://cal.example). Sam! -- Jane"
        );
    }

    #[test]
    fn missing_template_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let body =
            build_onboarding_body("Sam", "", "Jane", Some(dir.path().join("absent.txt").as_path())).unwrap();
        assert!(body.starts_with("Hi Sam,"));
    }

    #[test]
    fn body_file_wins_over_inline_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.txt");
        fs::write(&path, "from file").unwrap();

        let mut req = request();
        req.body = Some("inline".into());
        assert_eq!(req.resolve_body().unwrap(), "inline");
        req.body_file = Some(path);
        assert_eq!(req.resolve_body().unwrap(), "from file");
    }

    #[test]
    fn first_send_is_logged_then_repeat_is_skipped() {
        let mut log = SqliteSendLog::in_memory().unwrap();
        let mailer = RecordingMailer::default();

        let first = send_onboarding(&request(), &mut log, &mailer).unwrap();
        assert_eq!(first, SendOutcome::Sent { message_id: "msg-1".into() });
        let records = log.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message_id, "msg-1");
        assert_eq!(records[0].template_version, "default-v1");

        let second = send_onboarding(&request(), &mut log, &mailer).unwrap();
        assert_eq!(second, SendOutcome::Skipped);
        assert_eq!(mailer.sent.borrow().len(), 1);
        assert_eq!(log.records().unwrap().len(), 1);
    }

    #[test]
    fn allow_duplicate_sends_again() {
        let mut log = SqliteSendLog::in_memory().unwrap();
        let mailer = RecordingMailer::default();
        send_onboarding(&request(), &mut log, &mailer).unwrap();

        let mut again = request();
        again.allow_duplicate = true;
        let outcome = send_onboarding(&again, &mut log, &mailer).unwrap();
        assert_eq!(outcome, SendOutcome::Sent { message_id: "msg-2".into() });
        assert_eq!(log.records().unwrap().len(), 2);
    }

    #[test]
    fn new_template_version_is_not_a_duplicate() {
        let mut log = SqliteSendLog::in_memory().unwrap();
        let mailer = RecordingMailer::default();
        send_onboarding(&request(), &mut log, &mailer).unwrap();

        let mut next = request();
        next.template_version = "default-v2".into();
        assert!(matches!(
            send_onboarding(&next, &mut log, &mailer).unwrap(),
            SendOutcome::Sent { .. }
        ));
    }

    #[test]
    fn failed_send_is_not_logged() {
        let mut log = SqliteSendLog::in_memory().unwrap();
        assert!(send_onboarding(&request(), &mut log, &FailingMailer).is_err());
        assert!(log.records().unwrap().is_empty());
    }

    #[test]
    fn mailer_gets_resolved_body() {
        let mut log = SqliteSendLog::in_memory().unwrap();
        let mailer = RecordingMailer::default();
        let mut req = request();
        req.body = Some("Custom note".into());
        send_onboarding(&req, &mut log, &mailer).unwrap();

        let sent = mailer.sent.borrow();
        assert_eq!(sent[0].0, "coach@example.com");
        assert_eq!(sent[0].1, "client@example.com");
        assert_eq!(sent[0].2, DEFAULT_SUBJECT);
        assert_eq!(sent[0].3, "Custom note");
    }
}
