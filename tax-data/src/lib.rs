//! Loading year-table overrides from JSON documents and bracket CSV files.

mod bracket_csv;
mod documents;
mod error;
mod sources;

pub use bracket_csv::{BracketCsvLoader, BracketRecord, GroupedSchedules};
pub use documents::{OverrideDocumentLoader, validate_override, validate_schedule};
pub use error::TableLoadError;
pub use sources::TableSources;
