use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Column order of every lead table, CSV or spreadsheet.
pub const LEAD_HEADER: [&str; 7] = [
    "name",
    "role",
    "website_url",
    "linkedin_url",
    "location",
    "specialty",
    "evidence",
];

/// One prospective contact. Field order matches `LEAD_HEADER`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lead {
    pub name: String,
    pub role: String,
    pub website_url: String,
    pub linkedin_url: String,
    pub location: String,
    pub specialty: String,
    pub evidence: String,
}

impl Lead {
    pub fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.role.clone(),
            self.website_url.clone(),
            self.linkedin_url.clone(),
            self.location.clone(),
            self.specialty.clone(),
            self.evidence.clone(),
        ]
    }
}

/// Header plus one row per lead, as written to a spreadsheet.
pub fn table(leads: &[Lead]) -> Vec<Vec<String>> {
    std::iter::once(LEAD_HEADER.iter().map(|h| h.to_string()).collect())
        .chain(leads.iter().map(Lead::row))
        .collect()
}

/// Write all leads to `path`, replacing any previous file.
pub fn write_csv(path: &Path, leads: &[Lead]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to open {:?}", path))?;
    // Header comes from the field names; write it even when there are no rows.
    if leads.is_empty() {
        writer.write_record(LEAD_HEADER)?;
    }
    for lead in leads {
        writer.serialize(lead)?;
    }
    writer.flush()?;
    Ok(())
}
