pub mod credentials;
pub mod locator;
pub mod metrics;
pub mod sheets;

pub use credentials::{CredentialError, ServiceAccountAuth};
pub use sheets::{GoogleSheetsClient, SheetsError, SpreadsheetSource};
