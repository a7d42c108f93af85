//! Sheet store — the remote tabular persisted log.
//!
//! The log is a key-identified spreadsheet with one (role, content) row per
//! message. The service exposes exactly the two operations the contract
//! needs: a bulk read of all rows (the caller slices the recent tail) and a
//! single-row append. Authentication is a pre-issued bearer token.

use async_trait::async_trait;
use chatling_core::error::StoreError;
use chatling_core::{Message, Role, TranscriptStore};
use serde::Deserialize;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// The two-column range the transcript occupies.
const RANGE: &str = "Sheet1!A:B";

/// A remote sheet-backed transcript store.
pub struct SheetStore {
    base_url: String,
    sheet_id: String,
    token: String,
    client: reqwest::Client,
}

impl SheetStore {
    /// Create a store for the given sheet, authenticated by a bearer token.
    pub fn new(sheet_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_base_url(sheet_id, token, DEFAULT_BASE_URL)
    }

    /// Create a store against a custom endpoint (proxies, test servers).
    pub fn with_base_url(
        sheet_id: impl Into<String>,
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sheet_id: sheet_id.into(),
            token: token.into(),
            client,
        }
    }

    /// Convert raw sheet rows into messages, preserving order.
    ///
    /// Rows whose first cell is not a known role are skipped with a warning
    /// rather than failing the whole load — this also drops any header row.
    fn rows_to_messages(rows: Vec<Vec<String>>) -> Vec<Message> {
        rows.into_iter()
            .filter_map(|row| {
                let mut cells = row.into_iter();
                let role_cell = cells.next().unwrap_or_default();
                let content = cells.next().unwrap_or_default();
                match Role::parse(&role_cell) {
                    Some(role) => Some(Message { role, content }),
                    None => {
                        warn!(cell = %role_cell, "Skipping sheet row with unknown role");
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl TranscriptStore for SheetStore {
    fn name(&self) -> &str {
        "sheet"
    }

    async fn load_recent(&self, n: usize) -> Result<Vec<Message>, StoreError> {
        let url = format!("{}/{}/values/{}", self.base_url, self.sheet_id, RANGE);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let value_range: ValueRange =
            response.json().await.map_err(|e| StoreError::ApiError {
                status_code: 200,
                message: format!("Failed to parse value range: {e}"),
            })?;

        let mut messages = Self::rows_to_messages(value_range.values.unwrap_or_default());
        let start = messages.len().saturating_sub(n);
        let recent = messages.split_off(start);

        debug!(rows = recent.len(), "Loaded recent transcript rows from sheet");
        Ok(recent)
    }

    async fn append(&self, message: &Message) -> Result<(), StoreError> {
        let url = format!(
            "{}/{}/values/{}:append?valueInputOption=RAW",
            self.base_url, self.sheet_id, RANGE
        );

        let body = serde_json::json!({
            "values": [[message.role.as_str(), message.content]],
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            return Err(StoreError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        Ok(())
    }
}

/// The bulk-read response body.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<String>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str, content: &str) -> Vec<String> {
        vec![role.to_string(), content.to_string()]
    }

    #[test]
    fn rows_convert_in_order() {
        let messages = SheetStore::rows_to_messages(vec![
            row("user", "안녕"),
            row("assistant", "안녕! 반가워 🐱"),
        ]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "안녕");
        assert_eq!(messages[1].role, Role::Assistant);
    }

    #[test]
    fn header_and_unknown_roles_are_skipped() {
        let messages = SheetStore::rows_to_messages(vec![
            row("role", "content"),
            row("user", "hi"),
            row("system", "not a transcript row"),
        ]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hi");
    }

    #[test]
    fn short_row_yields_empty_content() {
        let messages = SheetStore::rows_to_messages(vec![vec!["user".to_string()]]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "");
    }

    #[test]
    fn parse_value_range() {
        let data = r#"{
            "range": "Sheet1!A1:B3",
            "majorDimension": "ROWS",
            "values": [["user", "hello"], ["assistant", "hi there!"]]
        }"#;
        let parsed: ValueRange = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.values.unwrap().len(), 2);
    }

    #[test]
    fn parse_empty_sheet_has_no_values() {
        // An empty sheet omits the "values" field entirely.
        let parsed: ValueRange = serde_json::from_str(r#"{"range": "Sheet1!A:B"}"#).unwrap();
        assert!(parsed.values.is_none());
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let store = SheetStore::with_base_url("sheet-1", "tok", "http://localhost:8000/");
        assert_eq!(store.base_url, "http://localhost:8000");
        assert_eq!(store.name(), "sheet");
    }
}
