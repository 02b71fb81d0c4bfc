use std::collections::HashSet;

use indicatif::ProgressBar;
use tracing::{debug, error, info, warn};

use crate::fetch::{Fetcher, Pacer};
use crate::lead::Lead;
use crate::parser::extract::location::LocationMatcher;
use crate::parser::results::domain_of;
use crate::parser::{process_page, PageVerdict};
use crate::search::{find_profile, SearchEngine};
use crate::vocab::Vocabulary;

const RESULTS_PER_QUERY: usize = 10;
const SKIPPED_HOST: &str = "linkedin.com";

/// Search-and-fetch loop that turns search results into leads.
pub struct LeadPipeline<'a, S: SearchEngine, F: Fetcher> {
    search: &'a S,
    fetcher: &'a F,
    vocab: &'a Vocabulary,
    locations: LocationMatcher,
    pacer: Pacer,
    progress: ProgressBar,
}

impl<'a, S: SearchEngine, F: Fetcher> LeadPipeline<'a, S, F> {
    pub fn new(search: &'a S, fetcher: &'a F, vocab: &'a Vocabulary, pacer: Pacer) -> Self {
        LeadPipeline {
            search,
            fetcher,
            vocab,
            locations: LocationMatcher::new(vocab.regions),
            pacer,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Collect up to `limit` leads, one per source domain, walking every
    /// (target, seed) pair in order until the limit is hit or pairs run out.
    pub fn run(&self, limit: usize) -> Vec<Lead> {
        let targets = self.vocab.targets();
        let mut leads = Vec::new();
        let mut seen_domains = HashSet::new();

        info!("Starting search for {} leads across {} locations", limit, targets.len());
        self.progress
            .set_length((targets.len() * self.vocab.seeds.len()) as u64);

        'pairs: for target in &targets {
            for seed in self.vocab.seeds {
                if leads.len() >= limit {
                    info!("Reached target of {} leads", limit);
                    break 'pairs;
                }
                self.progress.inc(1);
                let query = format!("\"{}\" \"{}\"", seed, target);
                self.progress.set_message(query.clone());

                let links = match self.search.search(&query, RESULTS_PER_QUERY) {
                    Ok(links) => links,
                    Err(e) => {
                        error!("Search failed for query '{}': {}", query, e);
                        continue;
                    }
                };

                for link in links {
                    if leads.len() >= limit {
                        break 'pairs;
                    }
                    let domain = domain_of(&link);
                    if domain.is_empty() || seen_domains.contains(&domain) {
                        continue;
                    }
                    if domain.contains(SKIPPED_HOST) {
                        continue;
                    }
                    seen_domains.insert(domain);

                    if let Some(lead) = self.visit(&link, target) {
                        info!("Added lead #{}: {} from {}", leads.len() + 1, lead.name, lead.location);
                        leads.push(lead);
                    }
                }
            }
        }

        self.progress.finish_and_clear();
        leads
    }

    fn visit(&self, link: &str, target: &str) -> Option<Lead> {
        let html = match self.fetcher.fetch(link) {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to fetch {}: {}", link, e);
                return None;
            }
        };
        self.pacer.pause();

        let fields = match process_page(&html, self.vocab, &self.locations) {
            PageVerdict::Qualified(fields) => fields,
            PageVerdict::NoTrigger => {
                debug!("Skipping {}: doesn't look like {}", link, self.vocab.role);
                return None;
            }
            PageVerdict::Excluded => {
                debug!("Skipping {}: contains excluded keywords", link);
                return None;
            }
        };

        let location = if fields.location.is_empty() {
            target.to_string()
        } else {
            fields.location
        };
        let linkedin_url = if fields.profile_link.is_empty() {
            find_profile(self.search, &fields.name, self.vocab.profile_query)
        } else {
            fields.profile_link
        };
        let name = if fields.name.is_empty() {
            "Unknown".to_string()
        } else {
            fields.name
        };

        Some(Lead {
            name,
            role: self.vocab.role.to_string(),
            website_url: link.to_string(),
            linkedin_url,
            location,
            specialty: fields.specialty,
            evidence: fields.evidence,
        })
    }
}
