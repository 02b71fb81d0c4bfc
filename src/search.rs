use tracing::{info, warn};
use url::Url;

use crate::fetch::{FetchError, Fetcher, Pacer};
use crate::parser::extract::profile::is_personal_profile;
use crate::parser::results::extract_result_links;

/// A web search returning outbound result links.
pub trait SearchEngine {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, FetchError>;
}

/// HTML results-page search, rate limited by a fixed pause before each query.
pub struct WebSearch<'a, F: Fetcher> {
    fetcher: &'a F,
    endpoint: String,
    pacer: Pacer,
}

impl<'a, F: Fetcher> WebSearch<'a, F> {
    pub fn new(fetcher: &'a F, endpoint: impl Into<String>, pacer: Pacer) -> Self {
        WebSearch {
            fetcher,
            endpoint: endpoint.into(),
            pacer,
        }
    }

    fn query_url(&self, query: &str) -> Result<String, FetchError> {
        Url::parse_with_params(&self.endpoint, &[("q", query)])
            .map(String::from)
            .map_err(|e| FetchError::Unreachable(format!("{}: {}", self.endpoint, e)))
    }
}

impl<F: Fetcher> SearchEngine for WebSearch<'_, F> {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, FetchError> {
        self.pacer.pause();
        let url = self.query_url(query)?;
        let html = self.fetcher.fetch(&url)?;
        let links = extract_result_links(&html, max_results);
        info!("Found {} results for query: {}", links.len(), query);
        Ok(links)
    }
}

/// One targeted search for a person's LinkedIn profile. Failures are logged
/// and yield an empty string.
pub fn find_profile<S: SearchEngine + ?Sized>(search: &S, name: &str, persona: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    let query = format!("\"{}\" {}", name, persona);
    match search.search(&query, 5) {
        Ok(links) => links
            .into_iter()
            .find(|link| is_personal_profile(link))
            .unwrap_or_default(),
        Err(e) => {
            warn!("LinkedIn search failed for {}: {}", name, e);
            String::new()
        }
    }
}
