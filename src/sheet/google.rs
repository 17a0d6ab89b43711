//! Google Sheets values API client.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{SheetError, SheetSource};
use crate::config::Secret;

/// Spreadsheet backed by the hosted Google Sheets v4 values API.
///
/// Requests carry a pre-issued OAuth bearer token; minting and refreshing the
/// token is left to whoever deploys the service.
#[derive(Debug, Clone)]
pub struct GoogleSheetsSource {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: Secret,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl GoogleSheetsSource {
    pub fn new(base_url: String, spreadsheet_id: String, access_token: Secret) -> Self {
        Self {
            client: Client::new(),
            base_url,
            spreadsheet_id,
            access_token,
        }
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}` with each segment
    /// percent-encoded.
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url, SheetError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SheetError::ParseError(format!("invalid base url: {}", e)))?;
        let target = format!("{}{}", range, suffix);
        url.path_segments_mut()
            .map_err(|_| SheetError::ParseError("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                target.as_str(),
            ]);
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Spreadsheet API rejected request");
        Err(SheetError::HttpError {
            status: status.as_u16(),
            message,
        })
    }
}

fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsSource {
    async fn read_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetError> {
        let url = self.values_url(range, "")?;
        debug!(range = %range, "Fetching spreadsheet values");

        let response = self
            .client
            .get(url)
            .bearer_auth(self.access_token.expose())
            .send()
            .await
            .map_err(|e| SheetError::NetworkError(e.to_string()))?;

        let body: ValueRange = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SheetError::ParseError(e.to_string()))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn append_values(&self, range: &str, row: Vec<String>) -> Result<(), SheetError> {
        let mut url = self.values_url(range, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        debug!(range = %range, "Appending spreadsheet row");

        let response = self
            .client
            .post(url)
            .bearer_auth(self.access_token.expose())
            .json(&serde_json::json!({ "values": [row] }))
            .send()
            .await
            .map_err(|e| SheetError::NetworkError(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(base: &str) -> GoogleSheetsSource {
        GoogleSheetsSource::new(
            base.to_string(),
            "sheet-123".to_string(),
            Secret::new("token".to_string()),
        )
    }

    #[test]
    fn test_values_url_encodes_range() {
        let url = source("https://sheets.googleapis.com")
            .values_url("Sheet1!A:AC", "")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/Sheet1!A:AC"
        );

        let url = source("https://sheets.googleapis.com/")
            .values_url("My Sheet!A2", ":append")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/My%20Sheet!A2:append"
        );
    }

    #[test]
    fn test_values_url_rejects_bad_base() {
        assert!(matches!(
            source("not a url").values_url("A:A", ""),
            Err(SheetError::ParseError(_))
        ));
    }

    #[test]
    fn test_value_range_cells_become_text() {
        let body: ValueRange = serde_json::from_value(json!({
            "range": "Sheet1!A1:B2",
            "values": [["orderid", "Total Amount"], ["1", 600]]
        }))
        .unwrap();
        let rows: Vec<Vec<String>> = body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();
        assert_eq!(rows[1], vec!["1", "600"]);
    }

    #[test]
    fn test_value_range_without_values() {
        let body: ValueRange = serde_json::from_value(json!({ "range": "Sheet1!A1" })).unwrap();
        assert!(body.values.is_empty());
    }
}
