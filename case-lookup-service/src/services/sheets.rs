//! Spreadsheet access.
//!
//! [`SpreadsheetSource`] is the seam the request handler depends on;
//! [`GoogleSheetsClient`] implements it against the Google Sheets v4 REST API.

use super::credentials::{CredentialError, ServiceAccountAuth};
use crate::config::SheetsApiConfig;
use crate::models::Row;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Failed to authenticate with the spreadsheet service: {0}")]
    Credentials(#[from] CredentialError),

    #[error("Spreadsheet service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Spreadsheet service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Invalid spreadsheet service URL: {0}")]
    InvalidUrl(String),
}

impl From<SheetsError> for AppError {
    fn from(err: SheetsError) -> Self {
        AppError::ExternalService(anyhow::Error::new(err))
    }
}

/// Read access to spreadsheet-backed datasets.
#[async_trait]
pub trait SpreadsheetSource: Send + Sync {
    /// Titles of every sheet (tab) in the spreadsheet.
    async fn sheet_names(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetsError>;

    /// All populated rows of `sheet_name` within `columns` (e.g. `A:O`).
    ///
    /// An empty range yields an empty vector rather than an error.
    async fn get_range(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        columns: &str,
    ) -> Result<Vec<Row>, SheetsError>;
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<Value>>>,
}

/// Render a cell the way it reads in the sheet; null becomes the empty string.
fn cell_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

pub struct GoogleSheetsClient {
    client: Client,
    base_url: Url,
    auth: Arc<ServiceAccountAuth>,
}

impl GoogleSheetsClient {
    pub fn new(
        config: &SheetsApiConfig,
        auth: Arc<ServiceAccountAuth>,
        client: Client,
    ) -> Result<Self, SheetsError> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| SheetsError::InvalidUrl(format!("{}: {}", config.api_base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(SheetsError::InvalidUrl(config.api_base_url.clone()));
        }

        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    /// `{base}/v4/spreadsheets/{segments...}` with each segment percent-encoded.
    fn spreadsheet_url(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T>(&self, request: reqwest::RequestBuilder) -> Result<T, SheetsError>
    where
        T: serde::de::DeserializeOwned,
    {
        let token = self.auth.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SpreadsheetSource for GoogleSheetsClient {
    async fn sheet_names(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetsError> {
        let url = self.spreadsheet_url(&[spreadsheet_id])?;

        tracing::debug!(spreadsheet_id, "Fetching spreadsheet metadata");

        let metadata: SpreadsheetMetadata = self
            .get_json(
                self.client
                    .get(url)
                    .query(&[("fields", "sheets.properties.title")]),
            )
            .await?;

        Ok(metadata
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    async fn get_range(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        columns: &str,
    ) -> Result<Vec<Row>, SheetsError> {
        let range = format!("{}!{}", sheet_name, columns);
        let url = self.spreadsheet_url(&[spreadsheet_id, "values", &range])?;

        tracing::debug!(spreadsheet_id, range = %range, "Fetching sheet values");

        let values: ValueRange = self.get_json(self.client.get(url)).await?;

        Ok(values
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }
}
