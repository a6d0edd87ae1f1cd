#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
};
use case_lookup_service::config::LookupConfig;
use case_lookup_service::models::Row;
use case_lookup_service::services::{SheetsError, SpreadsheetSource};
use service_core::config::Config as CoreConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");
pub const TEST_CLIENT_EMAIL: &str = "case-reader@cyber-cell-test.iam.gserviceaccount.com";
pub const TEST_PRIVATE_KEY_ID: &str = "test-key-id";

/// Configuration with test credentials. `token_uri` and `api_base_url` point wherever the
/// test needs; the router tests never contact either.
pub fn test_config(token_uri: &str, api_base_url: &str) -> LookupConfig {
    let vars: HashMap<&str, String> = [
        ("PROJECT_ID", "cyber-cell-test"),
        ("PRIVATE_KEY_ID", TEST_PRIVATE_KEY_ID),
        ("PRIVATE_KEY", TEST_PRIVATE_KEY),
        ("CLIENT_EMAIL", TEST_CLIENT_EMAIL),
        ("CLIENT_ID", "100000000000000000001"),
        ("AUTH_URI", "https://accounts.google.com/o/oauth2/auth"),
        ("TOKEN_URI", token_uri),
        ("AUTH_PROVIDER_X509_CERT_URL", "https://www.googleapis.com/oauth2/v1/certs"),
        ("CLIENT_X509_CERT_URL", "https://www.googleapis.com/robot/v1/metadata/x509/case-reader"),
        ("SHEETS_API_BASE_URL", api_base_url),
        ("SHEETS_REQUEST_TIMEOUT_SECS", "5"),
        ("LOG_LEVEL", "error"),
        ("ALLOWED_ORIGINS", "https://cyber-frontend-jade.vercel.app,https://cyber-frontend-jade.vercel.app/"),
    ]
    .into_iter()
    .map(|(k, v)| (k, v.to_string()))
    .collect();

    let common = CoreConfig { port: 0 };

    LookupConfig::from_lookup(common, |key| vars.get(key).cloned())
        .expect("Failed to build test configuration")
}

pub fn router_config() -> LookupConfig {
    test_config("http://127.0.0.1:9/token", "http://127.0.0.1:9")
}

pub fn row(cells: &[&str]) -> Row {
    cells.iter().map(|c| c.to_string()).collect()
}

/// In-memory spreadsheet store keyed by spreadsheet id.
#[derive(Default)]
pub struct FakeSheets {
    sheets: Mutex<HashMap<String, Vec<(String, Vec<Row>)>>>,
    fail: bool,
    metadata_calls: AtomicUsize,
    range_calls: AtomicUsize,
}

impl FakeSheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the spreadsheet service were unreachable.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_sheet(self, spreadsheet_id: &str, sheet_name: &str, rows: Vec<Row>) -> Self {
        self.sheets
            .lock()
            .unwrap()
            .entry(spreadsheet_id.to_string())
            .or_default()
            .push((sheet_name.to_string(), rows));
        self
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn range_calls(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }

    fn unavailable() -> SheetsError {
        SheetsError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "backend unavailable".to_string(),
        }
    }
}

#[async_trait]
impl SpreadsheetSource for FakeSheets {
    async fn sheet_names(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetsError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Self::unavailable());
        }

        let sheets = self.sheets.lock().unwrap();
        match sheets.get(spreadsheet_id) {
            Some(tabs) => Ok(tabs.iter().map(|(name, _)| name.clone()).collect()),
            None => Err(SheetsError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                body: format!("Requested entity was not found: {}", spreadsheet_id),
            }),
        }
    }

    async fn get_range(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        _columns: &str,
    ) -> Result<Vec<Row>, SheetsError> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Self::unavailable());
        }

        let sheets = self.sheets.lock().unwrap();
        Ok(sheets
            .get(spreadsheet_id)
            .and_then(|tabs| tabs.iter().find(|(name, _)| name == sheet_name))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
