pub mod extract;
pub mod results;
pub mod text;
pub mod tokens;

use crate::vocab::Vocabulary;
use extract::location::LocationMatcher;
use extract::qualify::{mentions_exclusion, mentions_trigger};
use extract::ExtractedFields;

/// Outcome of reading one candidate page.
#[derive(Debug)]
pub enum PageVerdict {
    Qualified(ExtractedFields),
    NoTrigger,
    Excluded,
}

/// Two-step read of a fetched page: visible text decides qualification,
/// then fields are pulled from text and markup.
pub fn process_page(html: &str, vocab: &Vocabulary, locations: &LocationMatcher) -> PageVerdict {
    let text = text::visible_text(html);
    if !mentions_trigger(&text, vocab.triggers) {
        return PageVerdict::NoTrigger;
    }
    if mentions_exclusion(&text, vocab.exclusions) {
        return PageVerdict::Excluded;
    }
    PageVerdict::Qualified(extract::extract_all(html, &text, vocab, locations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::EXECUTIVE_COACH;

    fn verdict(html: &str) -> PageVerdict {
        let matcher = LocationMatcher::new(EXECUTIVE_COACH.regions);
        process_page(html, &EXECUTIVE_COACH, &matcher)
    }

    #[test]
    fn qualifying_page_yields_fields() {
        let html = "<h1>Mark Lee: Coach</h1><p>Leadership coach in Raleigh, NC.</p>";
        match verdict(html) {
            PageVerdict::Qualified(fields) => {
                assert_eq!(fields.name, "Mark Lee");
                assert_eq!(fields.location, "Raleigh, NC");
            }
            other => panic!("expected qualified page, got {:?}", other),
        }
    }

    #[test]
    fn trigger_hidden_in_script_does_not_count() {
        let html = "<script>var role = 'executive coach';</script><p>Yoga classes</p>";
        assert!(matches!(verdict(html), PageVerdict::NoTrigger));
    }

    #[test]
    fn excluded_page() {
        let html = "<p>Executive coach for software teams</p>";
        assert!(matches!(verdict(html), PageVerdict::Excluded));
    }
}
