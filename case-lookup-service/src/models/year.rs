//! The closed set of yearly case registers.
//!
//! Each supported year maps to one spreadsheet, the tab inside it that holds
//! the case rows, and the place the column labels come from. Anything else
//! is rejected while parsing the path, before any spreadsheet call is made.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::record::Row;

/// Columns fetched from the target sheet.
pub const DATA_COLUMNS: &str = "A:O";

/// Column labels used for registers whose first row is not trusted as a header.
pub const FALLBACK_HEADERS: [&str; 11] = [
    "Sr. No.",
    "Ack. No.",
    "Applicant Name",
    "Date",
    "Mobile No.",
    "Fraud Amount",
    "Refund Amount",
    "Fraud Type",
    "Inquiry",
    "O/w No and Date",
    "Status (Close/Tr.)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseYear {
    Y2024,
    Y2025,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSource {
    /// The sheet's own first row labels the columns.
    FirstRow,
    /// [`FALLBACK_HEADERS`] label the columns regardless of sheet content.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported year '{0}'")]
pub struct UnsupportedYear(pub String);

impl CaseYear {
    pub const ALL: [CaseYear; 2] = [CaseYear::Y2024, CaseYear::Y2025];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseYear::Y2024 => "2024",
            CaseYear::Y2025 => "2025",
        }
    }

    /// Google Sheets spreadsheet id holding this year's register.
    pub fn spreadsheet_id(&self) -> &'static str {
        match self {
            CaseYear::Y2024 => "1KclTD7lAMXaOMtndW4a_dx5BPi40DJuuF0Hl_UvwVPc",
            CaseYear::Y2025 => "13dA2ZrojHegk4dwXIRz0yTfeZo1gy77QVx4ug3IRkEw",
        }
    }

    pub fn sheet_name(&self) -> &'static str {
        match self {
            CaseYear::Y2024 => "2024 All Data",
            CaseYear::Y2025 => "All Data 2025",
        }
    }

    pub fn header_source(&self) -> HeaderSource {
        match self {
            CaseYear::Y2024 => HeaderSource::Fallback,
            CaseYear::Y2025 => HeaderSource::FirstRow,
        }
    }
}

impl HeaderSource {
    pub fn resolve(&self, rows: &[Row]) -> Vec<String> {
        match self {
            HeaderSource::FirstRow => rows.first().cloned().unwrap_or_default(),
            HeaderSource::Fallback => FALLBACK_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl FromStr for CaseYear {
    type Err = UnsupportedYear;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2024" => Ok(CaseYear::Y2024),
            "2025" => Ok(CaseYear::Y2025),
            other => Err(UnsupportedYear(other.to_string())),
        }
    }
}

impl fmt::Display for CaseYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
