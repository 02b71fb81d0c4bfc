/// A region the location matcher recognises: full name plus two-letter code.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub name: &'static str,
    pub code: &'static str,
}

const fn region(name: &'static str, code: &'static str) -> Region {
    Region { name, code }
}

/// Keyword tables that steer one lead-sourcing persona.
///
/// Everything the extractors and the pipeline match against lives here, so a
/// different persona is a different `Vocabulary` value rather than a code change.
#[derive(Debug)]
pub struct Vocabulary {
    /// Role label written into every lead row.
    pub role: &'static str,
    /// Persona phrase appended to the profile fallback search.
    pub profile_query: &'static str,
    pub seeds: &'static [&'static str],
    pub cities: &'static [&'static str],
    pub regions: &'static [Region],
    pub triggers: &'static [&'static str],
    pub exclusions: &'static [&'static str],
    pub specialties: &'static [&'static str],
}

impl Vocabulary {
    /// Search targets in run order: cities first, then region full names.
    pub fn targets(&self) -> Vec<&'static str> {
        self.cities
            .iter()
            .copied()
            .chain(self.regions.iter().map(|r| r.name))
            .collect()
    }
}

pub const EAST_COAST_REGIONS: &[Region] = &[
    region("Maine", "ME"),
    region("New Hampshire", "NH"),
    region("Vermont", "VT"),
    region("Massachusetts", "MA"),
    region("Rhode Island", "RI"),
    region("Connecticut", "CT"),
    region("New York", "NY"),
    region("New Jersey", "NJ"),
    region("Pennsylvania", "PA"),
    region("Delaware", "DE"),
    region("Maryland", "MD"),
    region("District of Columbia", "DC"),
    region("Virginia", "VA"),
    region("North Carolina", "NC"),
    region("South Carolina", "SC"),
    region("Georgia", "GA"),
    region("Florida", "FL"),
];

pub const EXECUTIVE_COACH: Vocabulary = Vocabulary {
    role: "Executive Coach",
    profile_query: "executive coach LinkedIn",
    seeds: &["executive coach", "leadership coach", "executive coaching"],
    cities: &[
        "New York, NY",
        "Boston, MA",
        "Philadelphia, PA",
        "Washington, DC",
        "Baltimore, MD",
        "Richmond, VA",
        "Raleigh, NC",
        "Charlotte, NC",
        "Atlanta, GA",
        "Miami, FL",
        "Orlando, FL",
        "Tampa, FL",
    ],
    regions: EAST_COAST_REGIONS,
    triggers: &["executive coach", "executive coaching", "leadership coach"],
    exclusions: &[
        "software",
        "engineering",
        "technical",
        "developer",
        "devops",
        "product manager",
        "cto",
        "cio",
        "it",
    ],
    specialties: &[
        "leadership",
        "c-suite",
        "ceo",
        "founder",
        "team",
        "organizational",
        "career",
        "communication",
        "strategy",
        "performance",
        "women leaders",
        "executive presence",
        "succession",
    ],
};
