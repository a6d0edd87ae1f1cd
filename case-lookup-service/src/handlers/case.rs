//! Case lookup by year and acknowledgment number.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use service_core::error::AppError;

use crate::{
    models::{CaseYear, Record, UnsupportedYear, DATA_COLUMNS},
    services::locator,
    AppState,
};

pub const INVALID_YEAR: &str = "Invalid year specified";
pub const SHEET_NOT_FOUND: &str = "Sheet not found";
pub const NO_DATA: &str = "No data found in the sheet";
pub const NO_RECORD: &str = "No records found for the given acknowledgment number";

/// `GET /api/case/:year/:ack_number`
///
/// Validates the year, confirms the year's sheet exists, fetches its rows and
/// returns the first row whose acknowledgment number ends in the same five
/// characters as `ack_number`.
pub async fn get_case(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Record>, AppError> {
    // Segments that do not decode to UTF-8 cannot name a supported year or a stored key.
    let Path((year, ack_number)) = path.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Rejected undecodable lookup path");
        AppError::BadRequest(anyhow::anyhow!(INVALID_YEAR))
    })?;

    tracing::info!(year = %year, ack_number = %ack_number, "Searching for acknowledgment number");

    let year: CaseYear = year.parse().map_err(|e: UnsupportedYear| {
        tracing::warn!(error = %e, "Rejected lookup for unsupported year");
        AppError::BadRequest(anyhow::anyhow!(INVALID_YEAR))
    })?;

    let spreadsheet_id = year.spreadsheet_id();
    let sheet_name = year.sheet_name();

    let sheet_names = state.sheets.sheet_names(spreadsheet_id).await?;
    tracing::info!(year = %year, sheets = ?sheet_names, "Available sheets");

    if !sheet_names.iter().any(|name| name == sheet_name) {
        tracing::warn!(year = %year, sheet = sheet_name, "Target sheet not found");
        return Err(AppError::NotFound(anyhow::anyhow!(SHEET_NOT_FOUND)));
    }

    let rows = state
        .sheets
        .get_range(spreadsheet_id, sheet_name, DATA_COLUMNS)
        .await?;

    if rows.is_empty() {
        tracing::warn!(year = %year, sheet = sheet_name, "No data found in the sheet");
        return Err(AppError::NotFound(anyhow::anyhow!(NO_DATA)));
    }

    let headers = year.header_source().resolve(&rows);
    tracing::info!(
        year = %year,
        rows = rows.len(),
        headers = ?headers,
        "Sheet data fetched"
    );

    match locator::locate(&rows, &headers, &ack_number) {
        Some(record) => {
            tracing::info!(year = %year, ack_number = %ack_number, "Found matching record");
            Ok(Json(record))
        }
        None => {
            tracing::info!(year = %year, ack_number = %ack_number, "No matching record found");
            Err(AppError::NotFound(anyhow::anyhow!(NO_RECORD)))
        }
    }
}
