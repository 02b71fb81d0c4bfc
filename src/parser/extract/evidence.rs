use crate::parser::text::collapse_whitespace;

const CHARS_BEFORE: usize = 60;
const CHARS_AFTER: usize = 120;

/// Snippet of `text` around the first trigger phrase found.
///
/// Phrases are tried in order; the window runs from 60 characters before the
/// match to 120 characters after its start, cut from the original text.
/// Phrases are ASCII, so ASCII lowercasing keeps byte offsets valid in `text`.
pub fn extract_evidence(text: &str, triggers: &[&str]) -> String {
    let lower = text.to_ascii_lowercase();
    triggers
        .iter()
        .find_map(|phrase| lower.find(&phrase.to_ascii_lowercase()))
        .map(|at| collapse_whitespace(window(text, at)))
        .unwrap_or_default()
}

fn window(text: &str, at: usize) -> &str {
    let start = text[..at]
        .char_indices()
        .rev()
        .nth(CHARS_BEFORE - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let end = text[at..]
        .char_indices()
        .nth(CHARS_AFTER)
        .map(|(i, _)| at + i)
        .unwrap_or(text.len());
    &text[start..end]
}
