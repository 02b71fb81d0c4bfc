use itertools::Itertools;

const MAX_TAGS: usize = 3;

/// Up to three vocabulary keywords found in `text`, in vocabulary order,
/// joined with ", ".
pub fn extract_specialty(text: &str, keywords: &[&str]) -> String {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .filter(|kw| lower.contains(*kw))
        .take(MAX_TAGS)
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::EXECUTIVE_COACH;

    #[test]
    fn at_most_three_in_vocabulary_order() {
        let text = "Strategy, Leadership, career growth, team performance, \
                    communication and succession for the CEO";
        let tags = extract_specialty(text, EXECUTIVE_COACH.specialties);
        assert_eq!(tags, "leadership, ceo, team");
        assert_eq!(tags.split(", ").count(), 3);
    }

    #[test]
    fn fewer_hits_than_cap() {
        assert_eq!(
            extract_specialty("Strategy for leadership", EXECUTIVE_COACH.specialties),
            "leadership, strategy"
        );
    }

    #[test]
    fn no_hits_is_empty() {
        assert_eq!(extract_specialty("gardening tips", EXECUTIVE_COACH.specialties), "");
    }
}
