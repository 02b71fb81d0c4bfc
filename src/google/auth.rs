//! OAuth for an installed app: stored token, refresh, or browser consent
//! through a loopback redirect.

use std::fs;
use std::future::Future;
use std::net::TcpListener;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use oauth::v2_0::{AuthorizationCodeGrant, Client as OAuthClient, RefreshAccessToken};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::GoogleError;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const REDIRECT_SCHEME: &str = "http";
const REDIRECT_HOST: &str = "localhost";

/// Tokens this close to expiry are refreshed rather than reused.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Google access tokens live one hour; the grant does not report it back.
const ACCESS_TOKEN_LIFETIME_SECS: i64 = 3600;

/// OAuth client registration from the downloaded `credentials.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn parse(json: &str) -> Result<Self, GoogleError> {
        let file: SecretsFile = serde_json::from_str(json)?;
        file.installed.or(file.web).ok_or_else(|| {
            GoogleError::InvalidCredentials("no \"installed\" or \"web\" client".into())
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, GoogleError> {
        Self::parse(&fs::read_to_string(path)?)
    }
}

/// Authorized-user token file, compatible with the JSON Google's client libraries write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    pub fn covers(&self, scopes: &[String]) -> bool {
        scopes.iter().all(|s| self.scopes.contains(s))
    }

    /// A token without an expiry never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| expiry - Duration::seconds(EXPIRY_MARGIN_SECS) <= now)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Store a freshly granted access token. Google omits the refresh token
    /// on refresh, so the old one is kept.
    fn renewed(mut self, access_token: String, refresh_token: Option<String>, now: DateTime<Utc>) -> Self {
        self.token = access_token;
        self.expiry = Some(now + Duration::seconds(ACCESS_TOKEN_LIFETIME_SECS));
        if let Some(refresh) = refresh_token {
            self.refresh_token = Some(refresh);
        }
        self
    }
}

pub struct GoogleAuth {
    client: Client,
    credentials_path: PathBuf,
    token_path: PathBuf,
    scopes: Vec<String>,
}

impl GoogleAuth {
    /// Fails with `MissingCredentials` before any network traffic when the
    /// client secrets file is absent.
    pub fn new(
        credentials_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
        scopes: &[&str],
    ) -> Result<Self, GoogleError> {
        let credentials_path = credentials_path.into();
        if !credentials_path.exists() {
            return Err(GoogleError::MissingCredentials(credentials_path));
        }
        Ok(GoogleAuth {
            client: Client::builder().build()?,
            credentials_path,
            token_path: token_path.into(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    /// A bearer token for the configured scopes, refreshing or running the
    /// consent flow when the stored one cannot be used.
    pub fn access_token(&self) -> Result<String, GoogleError> {
        let stored = self.load_token()?.filter(|t| t.covers(&self.scopes));

        if let Some(token) = &stored {
            if !token.is_expired(Utc::now()) {
                return Ok(token.token.clone());
            }
        }

        let token = match stored {
            Some(token) if token.can_refresh() => {
                info!("Refreshing expired credentials");
                self.refresh(token)?
            }
            _ => {
                info!("Starting OAuth flow");
                self.consent()?
            }
        };

        self.save_token(&token)?;
        info!("Saved credentials to {}", self.token_path.display());
        Ok(token.token)
    }

    fn load_token(&self) -> Result<Option<StoredToken>, GoogleError> {
        if !self.token_path.exists() {
            return Ok(None);
        }
        debug!("Loading existing token from {}", self.token_path.display());
        let raw = fs::read_to_string(&self.token_path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save_token(&self, token: &StoredToken) -> Result<(), GoogleError> {
        if let Some(parent) = self.token_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.token_path, serde_json::to_string_pretty(token)?)?;
        Ok(())
    }

    fn refresh(&self, token: StoredToken) -> Result<StoredToken, GoogleError> {
        let client = oauth_client(
            &token.client_id,
            &token.client_secret,
            DEFAULT_AUTH_URI,
            &token.token_uri,
            first_available_port()?,
        )?;
        let refresh_token = token.refresh_token.clone().unwrap_or_default();

        let (access_token, refresh_token) =
            block_on(RefreshAccessToken::new().refresh_access_token(&client, refresh_token))??;
        Ok(token.renewed(access_token, refresh_token, Utc::now()))
    }

    fn consent(&self) -> Result<StoredToken, GoogleError> {
        let secrets = ClientSecrets::from_file(&self.credentials_path)?;
        let client = oauth_client(
            &secrets.client_id,
            &secrets.client_secret,
            &secrets.auth_uri,
            &secrets.token_uri,
            first_available_port()?,
        )?;

        let mut grant = AuthorizationCodeGrant::new().with_pkce();
        for scope in &self.scopes {
            grant = grant.with_scope(scope.clone());
        }

        let (redirect_url, csrf_token) = grant.get_redirect_url(&client);
        println!("Please visit this URL to authorize this application: {}", redirect_url);

        let (access_token, refresh_token) =
            block_on(grant.wait_for_redirection(&client, csrf_token))??;

        let blank = StoredToken {
            token: String::new(),
            refresh_token: None,
            token_uri: secrets.token_uri,
            client_id: secrets.client_id,
            client_secret: secrets.client_secret,
            scopes: self.scopes.clone(),
            expiry: None,
        };
        Ok(blank.renewed(access_token, refresh_token, Utc::now()))
    }
}

fn oauth_client(
    client_id: &str,
    client_secret: &str,
    auth_uri: &str,
    token_uri: &str,
    redirect_port: u16,
) -> Result<OAuthClient, GoogleError> {
    Ok(OAuthClient::new(
        client_id.to_string(),
        Some(client_secret.to_string()),
        auth_uri.to_string(),
        token_uri.to_string(),
        REDIRECT_SCHEME.to_string(),
        REDIRECT_HOST.to_string(),
        redirect_port,
    )?)
}

/// A loopback port the OS reports free, for the consent redirect.
fn first_available_port() -> Result<u16, GoogleError> {
    Ok(TcpListener::bind((REDIRECT_HOST, 0))?.local_addr()?.port())
}

/// The OAuth grant is async; the rest of the program is blocking.
fn block_on<F: Future>(future: F) -> Result<F::Output, GoogleError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}
