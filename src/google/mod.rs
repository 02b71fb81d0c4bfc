//! Thin blocking clients for the Google APIs the commands talk to.

pub mod auth;
pub mod gmail;
pub mod sheets;

use std::path::PathBuf;

use reqwest::blocking::Response;
use thiserror::Error;

pub use auth::GoogleAuth;
pub use gmail::GmailClient;
pub use sheets::SheetsClient;

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Missing credentials file: {}", .0.display())]
    MissingCredentials(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Google API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid credentials file: {0}")]
    InvalidCredentials(String),
    #[error("authorization failed: {0}")]
    OAuth(#[from] oauth::v2_0::Error),
}

/// Turn a non-2xx response into `GoogleError::Api`, keeping the body for the message.
fn check(response: Response) -> Result<Response, GoogleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(GoogleError::Api {
        status: status.as_u16(),
        body,
    })
}
