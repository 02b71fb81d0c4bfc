use regex::Regex;

use crate::vocab::Region;

/// Finds "City, ST" mentions, or bare region names, for a fixed region table.
pub struct LocationMatcher {
    regions: Vec<(Region, Regex)>,
}

impl LocationMatcher {
    pub fn new(regions: &[Region]) -> Self {
        let regions = regions
            .iter()
            .map(|region| {
                let pattern = format!(
                    r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?),\s*{}\b",
                    regex::escape(region.code)
                );
                // Codes are two ASCII letters, so the pattern always compiles.
                (*region, Regex::new(&pattern).unwrap())
            })
            .collect();
        LocationMatcher { regions }
    }

    /// Regions are tried in table order; for each, a "City, ST" match wins
    /// over a bare full-name mention.
    pub fn extract(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        for (region, re) in &self.regions {
            if let Some(caps) = re.captures(text) {
                return format!("{}, {}", &caps[1], region.code);
            }
            if lower.contains(&region.name.to_lowercase()) {
                return region.name.to_string();
            }
        }
        String::new()
    }
}
