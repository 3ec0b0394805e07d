use std::path::PathBuf;

use rust_decimal::Decimal;
use tax_core::{FilingStatus, Jurisdiction, ScheduleError};
use thiserror::Error;

/// Errors that can occur when loading table override data.
#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("unrecognised jurisdiction '{value}' on row {row}")]
    InvalidJurisdiction { value: String, row: usize },

    #[error("unrecognised filing status '{value}' on row {row}")]
    InvalidFilingStatus { value: String, row: usize },

    #[error("{jurisdiction} {year} brackets for {status}: {source}")]
    InvalidSchedule {
        jurisdiction: Jurisdiction,
        year: i32,
        status: FilingStatus,
        #[source]
        source: ScheduleError,
    },

    #[error("{jurisdiction} {year} {field} has no single entry for other statuses to fall back on")]
    MissingSingle {
        jurisdiction: Jurisdiction,
        year: i32,
        field: &'static str,
    },

    #[error(
        "{jurisdiction} {year} brackets for qualifying_widow are never read; married_joint brackets apply"
    )]
    WidowSchedule { jurisdiction: Jurisdiction, year: i32 },

    #[error("{jurisdiction} {year} {field} for {status} is negative: {amount}")]
    NegativeAmount {
        jurisdiction: Jurisdiction,
        year: i32,
        field: &'static str,
        status: FilingStatus,
        amount: Decimal,
    },
}

impl From<csv::Error> for TableLoadError {
    fn from(err: csv::Error) -> Self {
        TableLoadError::CsvParse(err.to_string())
    }
}
