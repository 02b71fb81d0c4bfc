pub mod evidence;
pub mod location;
pub mod profile;
pub mod qualify;
pub mod specialty;

use std::sync::LazyLock;

use regex::Regex;

use super::text::{collapse_whitespace, visible_text};
use crate::vocab::Vocabulary;
use location::LocationMatcher;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap());

const NAME_SEPARATORS: &[&str] = &["|", "-", "—", ":"];

/// Everything a lead needs that can be read straight off one page.
/// Empty strings mean "not found".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub name: String,
    pub location: String,
    pub profile_link: String,
    pub specialty: String,
    pub evidence: String,
}

pub fn extract_all(
    html: &str,
    text: &str,
    vocab: &Vocabulary,
    locations: &LocationMatcher,
) -> ExtractedFields {
    let title = extract_title(html);
    let heading = extract_heading(html);

    ExtractedFields {
        name: guess_name(&title, &heading),
        location: locations.extract(text),
        profile_link: profile::extract_profile_link(html),
        specialty: specialty::extract_specialty(text, vocab.specialties),
        evidence: evidence::extract_evidence(text, vocab.triggers),
    }
}

/// Content of the first `<title>`, entities decoded.
pub fn extract_title(html: &str) -> String {
    first_element_text(&TITLE_RE, html)
}

/// Content of the first `<h1>`, inner tags dropped.
pub fn extract_heading(html: &str) -> String {
    first_element_text(&H1_RE, html)
}

fn first_element_text(re: &Regex, html: &str) -> String {
    re.captures(html)
        .map(|caps| visible_text(&caps[1]))
        .unwrap_or_default()
}

/// Person or business name from the page heading (preferred) or title,
/// cut at the first separator that appears.
pub fn guess_name(title: &str, heading: &str) -> String {
    let candidate = if heading.is_empty() { title } else { heading };
    let cut = NAME_SEPARATORS
        .iter()
        .find_map(|sep| candidate.split_once(sep).map(|(head, _)| head))
        .unwrap_or(candidate);
    collapse_whitespace(cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::EXECUTIVE_COACH;

    #[test]
    fn name_from_heading_with_pipe() {
        assert_eq!(guess_name("", "Jane Doe | Executive Coaching"), "Jane Doe");
    }

    #[test]
    fn heading_preferred_over_title() {
        assert_eq!(guess_name("Home - Acme", "Mark Lee"), "Mark Lee");
        assert_eq!(guess_name("Mark Lee: Leadership Coach", ""), "Mark Lee");
    }

    #[test]
    fn separator_order_decides_cut() {
        // "|" is checked before "-", so the hyphenated surname survives.
        assert_eq!(guess_name("", "Ana Smith-Jones | Coach"), "Ana Smith-Jones");
        assert_eq!(guess_name("", "Ana Smith — Coaching"), "Ana Smith");
    }

    #[test]
    fn empty_inputs_give_empty_name() {
        assert_eq!(guess_name("", ""), "");
    }

    #[test]
    fn title_is_unescaped_and_collapsed() {
        let html = "<HEAD><Title>\n  Smith &amp; Partners\n  Coaching </Title></HEAD>";
        assert_eq!(extract_title(html), "Smith & Partners Coaching");
    }

    #[test]
    fn heading_drops_inner_tags() {
        let html = r#"<h1 class="hero"><span>Jane</span> <em>Doe</em></h1><h1>Second</h1>"#;
        assert_eq!(extract_heading(html), "Jane Doe");
    }

    #[test]
    fn missing_title_is_empty() {
        assert_eq!(extract_title("<p>no title</p>"), "");
        assert_eq!(extract_heading("<p>no heading</p>"), "");
    }

    #[test]
    fn fixture_coach_page() {
        let html = std::fs::read_to_string("tests/fixtures/coach_page.html").unwrap();
        let text = visible_text(&html);
        let matcher = LocationMatcher::new(EXECUTIVE_COACH.regions);
        let fields = extract_all(&html, &text, &EXECUTIVE_COACH, &matcher);

        assert_eq!(fields.name, "Jane Doe");
        assert_eq!(fields.location, "Boston, MA");
        assert_eq!(fields.profile_link, "https://www.linkedin.com/in/janedoe");
        assert_eq!(fields.specialty, "leadership, c-suite, team");
        assert!(fields.evidence.to_lowercase().contains("executive coach"));
        // "c-suite" and "with" both contain the "it" exclusion.
        assert!(!qualify::qualifies(&text, EXECUTIVE_COACH.triggers, EXECUTIVE_COACH.exclusions));
    }
}
