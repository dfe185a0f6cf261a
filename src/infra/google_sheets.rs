use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use edustats::model::SheetInfo;
use edustats::services::SheetSource;

/// Read-only Google Sheets v4 client, bound to one spreadsheet.
///
/// Uses API-key access; the key only needs read permission on the
/// spreadsheet.
pub struct GoogleSheetsClient {
    base_url: String,
    api_key: String,
    sheet_id: String,
}

impl GoogleSheetsClient {
    pub fn new(api_key: String, sheet_id: String) -> Self {
        Self {
            base_url: "https://sheets.googleapis.com".to_string(),
            api_key,
            sheet_id,
        }
    }

    fn http_client() -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?)
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsClient {
    async fn list_sheets(&self) -> Result<Vec<SheetInfo>> {
        let url = format!(
            "{}/v4/spreadsheets/{}?key={}",
            self.base_url, self.sheet_id, self.api_key
        );

        let response = Self::http_client()?
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to reach Google Sheets: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Could not access the spreadsheet (status {}): check the id and read permission. {}",
                status,
                body
            ));
        }

        // Parse as generic JSON to extract only the fields we need
        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse spreadsheet metadata: {}", e))?;

        let sheets = json["sheets"]
            .as_array()
            .map(|sheets| {
                sheets
                    .iter()
                    .filter_map(|s| {
                        let props = &s["properties"];
                        let name = props["title"].as_str()?.to_string();
                        let id = props["sheetId"]
                            .as_i64()
                            .map(|id| id.to_string())
                            .unwrap_or_default();
                        Some(SheetInfo { name, id })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(sheets)
    }

    async fn sheet_rows(&self, sheet_name: &str) -> Result<Vec<Vec<String>>> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/'{}'?key={}",
            self.base_url, self.sheet_id, sheet_name, self.api_key
        );

        let response = Self::http_client()?
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to reach Google Sheets: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Failed to read sheet '{}' (status {}): {}",
                sheet_name,
                status,
                body
            ));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse sheet values: {}", e))?;

        let rows = json["values"]
            .as_array()
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.as_array()
                            .map(|cells| {
                                cells
                                    .iter()
                                    .map(|c| match c.as_str() {
                                        Some(s) => s.to_string(),
                                        None => c.to_string(),
                                    })
                                    .collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(rows)
    }
}
