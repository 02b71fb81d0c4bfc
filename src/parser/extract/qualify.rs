/// A page qualifies when it mentions a trigger phrase and no exclusion keyword.
pub fn qualifies(text: &str, triggers: &[&str], exclusions: &[&str]) -> bool {
    let lower = text.to_lowercase();
    mentions_any(&lower, triggers) && !mentions_any(&lower, exclusions)
}

pub fn mentions_trigger(text: &str, triggers: &[&str]) -> bool {
    mentions_any(&text.to_lowercase(), triggers)
}

/// Substring match, so "developers" and "CTOs" are caught along with
/// "developer" and "cto".
pub fn mentions_exclusion(text: &str, exclusions: &[&str]) -> bool {
    mentions_any(&text.to_lowercase(), exclusions)
}

fn mentions_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| lower.contains(kw))
}
