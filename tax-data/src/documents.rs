//! Per-jurisdiction JSON override documents.
//!
//! One document covers one jurisdiction. Top-level keys are tax years; each
//! value is a partial year table whose fields replace the baseline field
//! wholesale:
//!
//! ```json
//! {
//!   "2022": {
//!     "brackets": {
//!       "single": [{ "upTo": 10099, "rate": 0.01 }, { "upTo": null, "rate": 0.123 }]
//!     },
//!     "standardDeduction": { "single": 5202, "married_joint": 10404 },
//!     "personalExemptionCredit": { "single": 140, "married_joint": 280 },
//!     "rentersCredit": {
//!       "amount": { "single": 60, "married_joint": 120 },
//!       "incomeLimit": { "single": 49220, "married_joint": null }
//!     }
//!   }
//! }
//! ```
//!
//! A `null` upper bound or income limit means unbounded.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rust_decimal::Decimal;
use tax_core::{BracketSchedule, FilingStatus, Jurisdiction, YearTableOverride};
use tracing::info;

use crate::error::TableLoadError;

/// Loader for JSON year override documents.
pub struct OverrideDocumentLoader;

impl OverrideDocumentLoader {
    /// Parse and validate a document from any reader.
    pub fn parse<R: Read>(
        jurisdiction: Jurisdiction,
        reader: R,
    ) -> Result<BTreeMap<i32, YearTableOverride>, TableLoadError> {
        let overrides: BTreeMap<i32, YearTableOverride> = serde_json::from_reader(reader)?;

        for (&year, patch) in &overrides {
            validate_override(jurisdiction, year, patch)?;
        }

        Ok(overrides)
    }

    /// Read, parse and validate a document from disk.
    pub fn load(
        jurisdiction: Jurisdiction,
        path: &Path,
    ) -> Result<BTreeMap<i32, YearTableOverride>, TableLoadError> {
        let file = File::open(path).map_err(|source| TableLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let overrides = Self::parse(jurisdiction, BufReader::new(file))?;
        info!(
            %jurisdiction,
            path = %path.display(),
            years = ?overrides.keys().collect::<Vec<_>>(),
            "loaded table overrides"
        );
        Ok(overrides)
    }
}

/// Checks an override before it can reach the store.
///
/// Every status map that is present must carry a `single` entry, since that
/// is where statuses without their own entry land. Bracket lists must pass
/// [`BracketSchedule::validate`], qualifying widow(er) may not have its own
/// list, and no amount or income limit may be negative.
pub fn validate_override(
    jurisdiction: Jurisdiction,
    year: i32,
    patch: &YearTableOverride,
) -> Result<(), TableLoadError> {
    if let Some(brackets) = &patch.brackets {
        validate_schedule(jurisdiction, year, brackets)?;
    }

    let amount_fields = [
        ("standard deduction", patch.standard_deduction.as_ref()),
        (
            "personal exemption credit",
            patch.personal_exemption_credit.as_ref(),
        ),
        (
            "renter's credit",
            patch.renters_credit.as_ref().map(|credit| &credit.amount),
        ),
    ];
    for (field, amounts) in amount_fields {
        let Some(amounts) = amounts else {
            continue;
        };
        if amounts.get(FilingStatus::Single).is_none() {
            return Err(TableLoadError::MissingSingle {
                jurisdiction,
                year,
                field,
            });
        }
        check_non_negative(jurisdiction, year, field, |status| amounts.get(status))?;
    }

    // A missing limit means no limit, so `single` is not required here.
    if let Some(credit) = &patch.renters_credit {
        check_non_negative(jurisdiction, year, "renter's credit income limit", |status| {
            credit.income_limit.get(status).and_then(|limit| limit.as_option())
        })?;
    }

    Ok(())
}

/// Structural checks for one year's bracket schedule.
pub fn validate_schedule(
    jurisdiction: Jurisdiction,
    year: i32,
    brackets: &BracketSchedule,
) -> Result<(), TableLoadError> {
    if brackets.get(FilingStatus::Single).is_none() {
        return Err(TableLoadError::MissingSingle {
            jurisdiction,
            year,
            field: "brackets",
        });
    }
    if brackets.get(FilingStatus::QualifyingWidow).is_some() {
        return Err(TableLoadError::WidowSchedule { jurisdiction, year });
    }
    brackets
        .validate()
        .map_err(|(status, source)| TableLoadError::InvalidSchedule {
            jurisdiction,
            year,
            status,
            source,
        })
}

fn check_non_negative(
    jurisdiction: Jurisdiction,
    year: i32,
    field: &'static str,
    amount_for: impl Fn(FilingStatus) -> Option<Decimal>,
) -> Result<(), TableLoadError> {
    for status in FilingStatus::ALL {
        match amount_for(status) {
            Some(amount) if amount < Decimal::ZERO => {
                return Err(TableLoadError::NegativeAmount {
                    jurisdiction,
                    year,
                    field,
                    status,
                    amount,
                });
            }
            _ => {}
        }
    }
    Ok(())
}
