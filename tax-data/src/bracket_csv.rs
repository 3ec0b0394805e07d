use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{Bracket, BracketSchedule, FilingStatus, Jurisdiction, TableOverrides, UpperBound};
use tracing::{debug, info};

use crate::documents::validate_schedule;
use crate::error::TableLoadError;

/// A single record from a bracket CSV file.
///
/// - `tax_year`: The tax year (e.g., 2025)
/// - `jurisdiction`: `federal` or `california` (`fed`, `us` and `ca` also accepted)
/// - `filing_status`: One of the snake_case filing status names
/// - `up_to`: Upper edge of the bracket (empty for unlimited)
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
///
/// Rows for one (year, jurisdiction, status) are taken in file order.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub jurisdiction: String,
    pub filing_status: String,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub up_to: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Bracket schedules grouped by jurisdiction and year.
pub type GroupedSchedules = BTreeMap<(Jurisdiction, i32), BracketSchedule>;

/// Loader for bracket schedules from CSV files.
pub struct BracketCsvLoader;

impl BracketCsvLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, TableLoadError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Groups records into one validated schedule per (jurisdiction, year).
    ///
    /// Each schedule must include `single` and may not list
    /// `qualifying_widow`, which always uses `married_joint`.
    ///
    /// Jurisdiction and filing status names are strict here; a typo in a
    /// data file is reported with its row number instead of silently
    /// becoming `single`.
    pub fn group(records: &[BracketRecord]) -> Result<GroupedSchedules, TableLoadError> {
        let mut lists: BTreeMap<(Jurisdiction, i32, FilingStatus), Vec<Bracket>> = BTreeMap::new();

        for (index, record) in records.iter().enumerate() {
            // Header is line 1.
            let row = index + 2;
            let jurisdiction = Jurisdiction::parse(&record.jurisdiction).ok_or_else(|| {
                TableLoadError::InvalidJurisdiction {
                    value: record.jurisdiction.clone(),
                    row,
                }
            })?;
            let status = FilingStatus::parse(&record.filing_status).ok_or_else(|| {
                TableLoadError::InvalidFilingStatus {
                    value: record.filing_status.clone(),
                    row,
                }
            })?;

            lists
                .entry((jurisdiction, record.tax_year, status))
                .or_default()
                .push(Bracket {
                    up_to: UpperBound::from(record.up_to),
                    rate: record.rate,
                });
        }

        let mut grouped = GroupedSchedules::new();
        for ((jurisdiction, year, status), brackets) in lists {
            grouped
                .entry((jurisdiction, year))
                .or_default()
                .insert(status, brackets);
        }
        for ((jurisdiction, year), schedule) in &grouped {
            validate_schedule(*jurisdiction, *year, schedule)?;
        }

        Ok(grouped)
    }

    /// Installs grouped schedules as the `brackets` field of each year's
    /// override, replacing any brackets already there.
    ///
    /// Returns the number of (jurisdiction, year) schedules applied.
    pub fn apply(
        grouped: GroupedSchedules,
        overrides: &mut TableOverrides,
    ) -> usize {
        let mut applied = 0;

        for ((jurisdiction, year), schedule) in grouped {
            let patch = overrides
                .for_jurisdiction_mut(jurisdiction)
                .entry(year)
                .or_default();
            if patch.brackets.is_some() {
                debug!(%jurisdiction, year, "CSV brackets replace document brackets");
            }
            patch.brackets = Some(schedule);
            applied += 1;
        }

        applied
    }

    /// Read a CSV file and apply its schedules to `overrides`.
    pub fn load(
        path: &Path,
        overrides: &mut TableOverrides,
    ) -> Result<usize, TableLoadError> {
        let file = File::open(path).map_err(|source| TableLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let records = Self::parse(file)?;
        let grouped = Self::group(&records)?;
        let applied = Self::apply(grouped, overrides);
        info!(
            path = %path.display(),
            records = records.len(),
            schedules = applied,
            "loaded bracket CSV"
        );
        Ok(applied)
    }
}
