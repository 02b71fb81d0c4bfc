use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::FetchSettings;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("unreachable: {0}")]
    Unreachable(String),
}

/// Anything that turns a URL into page text.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fixed delay between outbound calls.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Pacer { delay }
    }

    #[cfg(test)]
    pub fn none() -> Self {
        Pacer::new(Duration::ZERO)
    }

    pub fn pause(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

/// Blocking HTTP fetcher with a bounded, fixed-delay retry loop.
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.fetch_timeout_secs))
            .build()?;
        Ok(HttpFetcher {
            client,
            max_retries: settings.max_retries.max(1),
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
        })
    }

    fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        // Decodes with the Content-Type charset, UTF-8 when absent.
        Ok(response.text()?)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        retry(self.max_retries, self.retry_delay, url, || self.fetch_once(url))
    }
}

/// Run `attempt` up to `max_retries` times, sleeping `delay` between tries,
/// and return the last error once attempts are exhausted.
pub fn retry<T, F>(max_retries: u32, delay: Duration, url: &str, mut attempt: F) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut tries = 0;
    loop {
        tries += 1;
        match attempt() {
            Ok(value) => return Ok(value),
            Err(e) if tries < max_retries => {
                warn!("Fetch failed (attempt {}/{}): {} - {}", tries, max_retries, url, e);
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
            }
            Err(e) => {
                error!("Fetch failed after {} attempts: {} - {}", tries, url, e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_returns_first_success() {
        let mut calls = 0;
        let result = retry(3, Duration::ZERO, "https://a.com", || {
            calls += 1;
            if calls < 2 {
                Err(FetchError::Unreachable("a.com".into()))
            } else {
                Ok("page")
            }
        });
        assert_eq!(result.unwrap(), "page");
        assert_eq!(calls, 2);
    }

    #[test]
    fn retry_surfaces_last_error() {
        let mut calls = 0;
        let result: Result<(), _> = retry(3, Duration::ZERO, "https://a.com", || {
            calls += 1;
            Err(FetchError::Status {
                url: "https://a.com".into(),
                status: 500 + calls,
            })
        });
        assert_eq!(calls, 3);
        match result {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, 503),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn single_attempt_when_retries_is_one() {
        let mut calls = 0;
        let _ = retry::<(), _>(1, Duration::ZERO, "u", || {
            calls += 1;
            Err(FetchError::Unreachable("u".into()))
        });
        assert_eq!(calls, 1);
    }
}
