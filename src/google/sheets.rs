use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{check, GoogleAuth, GoogleError};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
}

pub struct SheetsClient {
    auth: GoogleAuth,
}

impl SheetsClient {
    pub fn new(auth: GoogleAuth) -> Self {
        SheetsClient { auth }
    }

    /// Create a spreadsheet titled `title`, fill `Sheet1` from A1 with `rows`
    /// and return its browser URL.
    pub fn create_sheet(&self, title: &str, rows: &[Vec<String>]) -> Result<String, GoogleError> {
        let token = self.auth.access_token()?;
        let http = self.auth.http();

        let response = http
            .post(SHEETS_ENDPOINT)
            .bearer_auth(&token)
            .query(&[("fields", "spreadsheetId")])
            .json(&json!({ "properties": { "title": title } }))
            .send()?;
        let created: CreatedSpreadsheet = check(response)?.json()?;
        info!("Created spreadsheet {}", created.spreadsheet_id);

        let response = http
            .put(format!(
                "{}/{}/values/Sheet1!A1",
                SHEETS_ENDPOINT, created.spreadsheet_id
            ))
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": rows }))
            .send()?;
        check(response)?;
        info!("Wrote {} rows to spreadsheet", rows.len());

        Ok(spreadsheet_url(&created.spreadsheet_id))
    }
}

pub fn spreadsheet_url(id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}", id)
}

pub fn sheet_title(role: &str, date: NaiveDate) -> String {
    format!("{} Leads - {}", role, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_url() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(
            sheet_title("Executive Coach", date),
            "Executive Coach Leads - 2026-10-17"
        );
        assert_eq!(
            spreadsheet_url("1AbC"),
            "https://docs.google.com/spreadsheets/d/1AbC"
        );
    }

    #[test]
    fn created_response_shape() {
        let created: CreatedSpreadsheet =
            serde_json::from_str(r#"{"spreadsheetId":"1AbC"}"#).unwrap();
        assert_eq!(created.spreadsheet_id, "1AbC");
    }
}
