use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                                  AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0";

/// Process-wide settings, read from the environment (and `.env`).
///
/// Keys are the lower-cased environment variable names, so
/// `ONBOARDING_LOG_PATH` fills `onboarding_log_path`. CLI flags override.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub request_delay_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub search_endpoint: String,
    pub sheets_credentials_path: String,
    pub sheets_token_path: String,
    pub gmail_credentials_path: String,
    pub gmail_token_path: String,
    pub onboarding_log_path: String,
    pub onboarding_template_path: String,
    pub onboarding_template_version: String,
    pub onboarding_duplicate_window_hours: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_level: "info".into(),
            request_delay_ms: 1000,
            max_retries: 3,
            retry_delay_ms: 2000,
            fetch_timeout_secs: 20,
            user_agent: DEFAULT_USER_AGENT.into(),
            search_endpoint: "https://www.bing.com/search".into(),
            sheets_credentials_path: "credentials.json".into(),
            sheets_token_path: "token_sheets.json".into(),
            gmail_credentials_path: "credentials.json".into(),
            gmail_token_path: "token.json".into(),
            onboarding_log_path: ".tmp/onboarding_sends.csv".into(),
            onboarding_template_path: ".tmp/onboarding_email_template.txt".into(),
            onboarding_template_version: "default-v1".into(),
            onboarding_duplicate_window_hours: 24,
        }
    }
}

/// HTTP knobs handed to the fetcher.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Settings {
    pub fn fetch(&self) -> FetchSettings {
        FetchSettings {
            user_agent: self.user_agent.clone(),
            fetch_timeout_secs: self.fetch_timeout_secs,
            max_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
        }
    }
}

/// Load `.env` if present, then read settings from the environment.
pub fn load() -> Result<Settings> {
    let _ = dotenvy::dotenv();
    from_environment(Environment::default())
}

fn from_environment(env: Environment) -> Result<Settings> {
    Config::builder()
        .add_source(env.try_parsing(true))
        .build()
        .context("Failed to read settings from environment")?
        .try_deserialize()
        .context("Invalid settings")
}
