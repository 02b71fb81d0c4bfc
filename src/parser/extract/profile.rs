use std::sync::LazyLock;

use regex::Regex;

static PROFILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:www\.)?linkedin\.com/[\w\-/%?=&#.]+").unwrap()
});

/// First LinkedIn URL in the raw HTML, trailing punctuation trimmed.
pub fn extract_profile_link(html: &str) -> String {
    PROFILE_RE
        .find(html)
        .map(|m| m.as_str().trim_end_matches([')', '.', ',']).to_string())
        .unwrap_or_default()
}

/// Whether a URL points at a personal LinkedIn profile.
pub fn is_personal_profile(url: &str) -> bool {
    url.to_lowercase().contains("linkedin.com/in")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_link_in_anchor() {
        let html = r#"<a href="https://www.linkedin.com/in/jane-doe-123/">LinkedIn</a>"#;
        assert_eq!(extract_profile_link(html), "https://www.linkedin.com/in/jane-doe-123/");
    }

    #[test]
    fn trims_trailing_punctuation() {
        let text = "Connect (see https://linkedin.com/in/janedoe).";
        assert_eq!(extract_profile_link(text), "https://linkedin.com/in/janedoe");
    }

    #[test]
    fn none_found() {
        assert_eq!(extract_profile_link("<a href='https://twitter.com/jane'>x</a>"), "");
    }

    #[test]
    fn personal_profile_detection() {
        assert!(is_personal_profile("https://www.LinkedIn.com/in/jane"));
        assert!(!is_personal_profile("https://www.linkedin.com/company/acme"));
    }
}
