use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use mail_builder::MessageBuilder;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{check, GoogleAuth, GoogleError};
use crate::onboarding::Mailer;

pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

const SEND_ENDPOINT: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

#[derive(Debug, Deserialize)]
struct SentMessage {
    #[serde(default)]
    id: String,
}

pub struct GmailClient {
    auth: GoogleAuth,
}

impl GmailClient {
    pub fn new(auth: GoogleAuth) -> Self {
        GmailClient { auth }
    }

    pub fn send_message(
        &self,
        sender: &str,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, GoogleError> {
        info!("Sending email to {} with subject: {}", recipient, subject);
        let raw = encode_message(sender, recipient, subject, body)?;
        let token = self.auth.access_token()?;

        let response = self
            .auth
            .http()
            .post(SEND_ENDPOINT)
            .bearer_auth(token)
            .json(&json!({ "raw": raw }))
            .send()?;
        let sent: SentMessage = check(response)?.json()?;

        info!("Email sent successfully, message ID: {}", sent.id);
        Ok(sent.id)
    }
}

impl Mailer for GmailClient {
    fn send(&self, sender: &str, recipient: &str, subject: &str, body: &str) -> anyhow::Result<String> {
        Ok(self.send_message(sender, recipient, subject, body)?)
    }
}

/// Plain-text RFC 5322 message, base64url encoded as Gmail's `raw` field expects.
pub fn encode_message(
    sender: &str,
    recipient: &str,
    subject: &str,
    body: &str,
) -> Result<String, GoogleError> {
    let bytes = MessageBuilder::new()
        .from(sender)
        .to(recipient)
        .subject(subject)
        .text_body(body)
        .write_to_vec()?;
    Ok(URL_SAFE.encode(bytes))
}
