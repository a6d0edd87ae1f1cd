pub mod record;
pub mod year;

pub use record::{Record, Row};
pub use year::{CaseYear, HeaderSource, UnsupportedYear, DATA_COLUMNS, FALLBACK_HEADERS};
