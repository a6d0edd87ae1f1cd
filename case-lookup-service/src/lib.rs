pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use crate::config::LookupConfig;
use crate::services::SpreadsheetSource;
use std::sync::Arc;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: LookupConfig,
    pub sheets: Arc<dyn SpreadsheetSource>,
}

impl AppState {
    pub fn new(config: LookupConfig, sheets: Arc<dyn SpreadsheetSource>) -> Self {
        Self { config, sheets }
    }
}
