use std::collections::HashSet;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use url::Url;

use super::tokens::{walk, Attrs, MarkupVisitor};

const RESULT_TAG: &str = "li";
const RESULT_CLASS: &str = "b_algo";
const REDIRECT_MARKER: &str = "bing.com/ck/a";
const REDIRECT_PARAM: &str = "u";
const REDIRECT_PREFIX: &str = "a1";

/// Outbound links of a search-results page, in page order.
///
/// Only anchors inside result containers count. Redirect wrappers are
/// resolved, relative links dropped, duplicates removed, and at most `max`
/// links returned.
pub fn extract_result_links(html: &str, max: usize) -> Vec<String> {
    let raw = walk(html, ResultScanner::default()).links;

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for link in raw {
        if links.len() >= max {
            break;
        }
        let resolved = resolve_redirect(&link);
        if !is_absolute_http(&resolved) || !seen.insert(resolved.clone()) {
            continue;
        }
        links.push(resolved);
    }
    links
}

#[derive(Default)]
struct ResultScanner {
    in_result: bool,
    links: Vec<String>,
}

impl MarkupVisitor for ResultScanner {
    fn open(&mut self, name: &str, attrs: &Attrs<'_>) {
        if name == RESULT_TAG && attrs.get("class").is_some_and(|c| c.contains(RESULT_CLASS)) {
            self.in_result = true;
            return;
        }
        if name == "a" && self.in_result {
            if let Some(href) = attrs.get("href").filter(|h| !h.is_empty()) {
                self.links.push(href.to_string());
            }
        }
    }

    fn close(&mut self, name: &str) {
        if name == RESULT_TAG {
            self.in_result = false;
        }
    }
}

/// Destination of a tracking redirect link, or the link itself when it is
/// not a redirect or its payload does not decode to an absolute URL.
pub fn resolve_redirect(link: &str) -> String {
    if !link.contains(REDIRECT_MARKER) {
        return link.to_string();
    }
    decode_redirect_target(link).unwrap_or_else(|| link.to_string())
}

fn decode_redirect_target(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    let encoded = parsed
        .query_pairs()
        .find(|(key, _)| key == REDIRECT_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())?;

    let payload = encoded.strip_prefix(REDIRECT_PREFIX).unwrap_or(encoded.as_str());
    let padding = (4 - payload.len() % 4) % 4;
    let padded = format!("{}{}", payload, "=".repeat(padding));

    let bytes = URL_SAFE.decode(padded.as_bytes()).ok()?;
    let decoded = String::from_utf8_lossy(&bytes).into_owned();
    is_absolute_http(&decoded).then_some(decoded)
}

pub fn is_absolute_http(link: &str) -> bool {
    Url::parse(link).is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
}

/// Lower-cased host of a URL; empty when the URL has none.
pub fn domain_of(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(target: &str) -> String {
        let encoded = URL_SAFE.encode(target.as_bytes());
        let trimmed = encoded.trim_end_matches('=');
        format!("https://www.bing.com/ck/a?!&&p=abc&u=a1{}&ntb=1", trimmed)
    }

    fn results_page(hrefs: &[&str]) -> String {
        let items: String = hrefs
            .iter()
            .map(|h| format!(r#"<li class="b_algo"><h2><a href="{}">x</a></h2></li>"#, h))
            .collect();
        format!(r#"<html><body><ol id="b_results">{}</ol></body></html>"#, items)
    }

    #[test]
    fn decodes_redirect_payload() {
        let link = wrap("https://janedoecoaching.com/about");
        assert_eq!(resolve_redirect(&link), "https://janedoecoaching.com/about");
    }

    #[test]
    fn keeps_redirect_with_invalid_payload() {
        let link = "https://www.bing.com/ck/a?u=a1!!!notbase64&ntb=1";
        assert_eq!(resolve_redirect(link), link);
    }

    #[test]
    fn keeps_redirect_with_relative_payload() {
        let encoded = URL_SAFE.encode(b"/local/path");
        let link = format!("https://www.bing.com/ck/a?u=a1{}", encoded);
        assert_eq!(resolve_redirect(&link), link);
    }

    #[test]
    fn keeps_redirect_without_payload() {
        let link = "https://www.bing.com/ck/a?p=1";
        assert_eq!(resolve_redirect(link), link);
    }

    #[test]
    fn leaves_plain_links_alone() {
        assert_eq!(resolve_redirect("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn only_links_inside_result_containers() {
        let html = r#"<a href="https://outside.com">nav</a>
            <li class="b_algo"><a href="https://inside.com">r</a></li>
            <li class="other"><a href="https://sidebar.com">s</a></li>"#;
        assert_eq!(extract_result_links(html, 10), vec!["https://inside.com"]);
    }

    #[test]
    fn caps_dedupes_and_drops_relative() {
        let redirect = wrap("https://a.com/");
        let html = results_page(&[
            "/relative",
            "https://a.com/",
            &redirect,
            "https://b.com/",
            "javascript:void(0)",
            "https://c.com/",
            "https://d.com/",
        ]);
        let links = extract_result_links(&html, 3);
        assert_eq!(links, vec!["https://a.com/", "https://b.com/", "https://c.com/"]);
    }

    #[test]
    fn fixture_results_page() {
        let html = std::fs::read_to_string("tests/fixtures/bing_results.html").unwrap();
        let links = extract_result_links(&html, 10);
        assert_eq!(links.len(), 3, "got {:?}", links);
        assert_eq!(links[0], "https://www.janedoecoaching.com/");
        assert!(links.iter().all(|l| is_absolute_http(l)));
        assert!(!links.iter().any(|l| l.contains("bing.com")));
    }

    #[test]
    fn domain_is_lowercased_host() {
        assert_eq!(domain_of("https://WWW.Example.com/a?b"), "www.example.com");
        assert_eq!(domain_of("not a url"), "");
    }
}
