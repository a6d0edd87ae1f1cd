//! Acknowledgment-number matching over fetched sheet rows.

use crate::models::{Record, Row};

/// Zero-based column holding the acknowledgment number.
pub const ACK_COLUMN: usize = 1;

/// Only this many trailing characters of an acknowledgment number are compared.
pub const SIGNIFICANT_SUFFIX_LEN: usize = 5;

/// Trim and keep the trailing [`SIGNIFICANT_SUFFIX_LEN`] characters.
pub fn normalize_ack(value: &str) -> &str {
    last_chars(value.trim(), SIGNIFICANT_SUFFIX_LEN)
}

fn last_chars(value: &str, n: usize) -> &str {
    match value.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((start, _)) if n > 0 => &value[start..],
        Some(_) => "",
        None => value,
    }
}

/// Find the first row whose acknowledgment cell shares the search key's suffix
/// and label it with `headers`.
///
/// Rows are scanned in order and the first hit wins, so two acknowledgment
/// numbers ending in the same five characters always resolve to the earlier
/// row. A row without an acknowledgment cell compares as the empty string.
pub fn locate(rows: &[Row], headers: &[String], search_key: &str) -> Option<Record> {
    let wanted = normalize_ack(search_key);

    let position = rows.iter().position(|row| {
        let cell = row.get(ACK_COLUMN).map(String::as_str).unwrap_or_default();
        let candidate = normalize_ack(cell);
        tracing::trace!(candidate, wanted, "Comparing acknowledgment suffix");
        candidate == wanted
    })?;

    tracing::debug!(row = position, "Acknowledgment suffix matched");
    Some(Record::from_row(headers, &rows[position]))
}
