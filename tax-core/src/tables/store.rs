use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use tracing::{debug, warn};

use super::builtin;
use crate::models::{Jurisdiction, YearTable, YearTableOverride};

static BUILTIN: LazyLock<TaxTableStore> = LazyLock::new(TaxTableStore::baseline);

/// Year overrides for both jurisdictions, as read from configuration documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOverrides {
    pub federal: BTreeMap<i32, YearTableOverride>,
    pub california: BTreeMap<i32, YearTableOverride>,
}

impl TableOverrides {
    pub fn for_jurisdiction(
        &self,
        jurisdiction: Jurisdiction,
    ) -> &BTreeMap<i32, YearTableOverride> {
        match jurisdiction {
            Jurisdiction::Federal => &self.federal,
            Jurisdiction::California => &self.california,
        }
    }

    pub fn for_jurisdiction_mut(
        &mut self,
        jurisdiction: Jurisdiction,
    ) -> &mut BTreeMap<i32, YearTableOverride> {
        match jurisdiction {
            Jurisdiction::Federal => &mut self.federal,
            Jurisdiction::California => &mut self.california,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.federal.is_empty() && self.california.is_empty()
    }
}

/// Resolved year tables for one jurisdiction.
///
/// Every supported year with an override is merged against the baseline once,
/// at construction. Lookups never fail: years without an override, and years
/// outside the supported range, resolve to the baseline.
#[derive(Debug, Clone)]
pub struct JurisdictionTables {
    jurisdiction: Jurisdiction,
    baseline_year: i32,
    baseline: YearTable,
    supported_years: RangeInclusive<i32>,
    years: BTreeMap<i32, YearTable>,
}

impl JurisdictionTables {
    pub fn new(
        jurisdiction: Jurisdiction,
        baseline_year: i32,
        baseline: YearTable,
        supported_years: RangeInclusive<i32>,
    ) -> Self {
        Self {
            jurisdiction,
            baseline_year,
            baseline,
            supported_years,
            years: BTreeMap::new(),
        }
    }

    /// Merges each override into the baseline.
    ///
    /// Overrides for years outside the supported range are dropped.
    pub fn with_overrides(
        mut self,
        overrides: &BTreeMap<i32, YearTableOverride>,
    ) -> Self {
        for (&year, patch) in overrides {
            if !self.supported_years.contains(&year) {
                warn!(
                    jurisdiction = %self.jurisdiction,
                    year,
                    "ignoring override for unsupported tax year"
                );
                continue;
            }
            self.years.insert(year, self.baseline.merged_with(patch));
        }
        self
    }

    pub fn jurisdiction(&self) -> Jurisdiction {
        self.jurisdiction
    }

    pub fn baseline_year(&self) -> i32 {
        self.baseline_year
    }

    pub fn baseline(&self) -> &YearTable {
        &self.baseline
    }

    pub fn supported_years(&self) -> RangeInclusive<i32> {
        self.supported_years.clone()
    }

    /// Years that carry their own override.
    pub fn overridden_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn year_table(
        &self,
        year: i32,
    ) -> &YearTable {
        if let Some(table) = self.years.get(&year) {
            return table;
        }
        if !self.supported_years.contains(&year) {
            debug!(
                jurisdiction = %self.jurisdiction,
                year,
                baseline_year = self.baseline_year,
                "unsupported tax year, using baseline table"
            );
        }
        &self.baseline
    }
}

/// Immutable tables for every jurisdiction.
///
/// Built once and shared by reference; it is never mutated after construction.
#[derive(Debug, Clone)]
pub struct TaxTableStore {
    federal: JurisdictionTables,
    california: JurisdictionTables,
}

impl TaxTableStore {
    pub fn new(
        federal: JurisdictionTables,
        california: JurisdictionTables,
    ) -> Self {
        Self {
            federal,
            california,
        }
    }

    /// Built-in baselines with no year overrides.
    pub fn baseline() -> Self {
        Self::with_overrides(&TableOverrides::default())
    }

    /// Built-in baselines merged with the given year overrides.
    pub fn with_overrides(overrides: &TableOverrides) -> Self {
        let federal = JurisdictionTables::new(
            Jurisdiction::Federal,
            builtin::BASELINE_YEAR,
            builtin::federal_2024(),
            builtin::FEDERAL_FIRST_YEAR..=builtin::FEDERAL_LAST_YEAR,
        )
        .with_overrides(&overrides.federal);

        let california = JurisdictionTables::new(
            Jurisdiction::California,
            builtin::BASELINE_YEAR,
            builtin::california_2024(),
            builtin::CALIFORNIA_FIRST_YEAR..=builtin::CALIFORNIA_LAST_YEAR,
        )
        .with_overrides(&overrides.california);

        Self::new(federal, california)
    }

    /// Process-wide store holding only the compiled-in tables.
    pub fn builtin() -> &'static TaxTableStore {
        &BUILTIN
    }

    pub fn tables(
        &self,
        jurisdiction: Jurisdiction,
    ) -> &JurisdictionTables {
        match jurisdiction {
            Jurisdiction::Federal => &self.federal,
            Jurisdiction::California => &self.california,
        }
    }

    pub fn get_year_table(
        &self,
        jurisdiction: Jurisdiction,
        year: i32,
    ) -> &YearTable {
        self.tables(jurisdiction).year_table(year)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Bracket, BracketSchedule, FilingStatus};

    fn ca_2023_override() -> YearTableOverride {
        YearTableOverride {
            standard_deduction: Some(
                [
                    (FilingStatus::Single, dec!(5363)),
                    (FilingStatus::MarriedJoint, dec!(10726)),
                ]
                .into_iter()
                .collect(),
            ),
            personal_exemption_credit: Some(
                [(FilingStatus::Single, dec!(144))].into_iter().collect(),
            ),
            ..Default::default()
        }
    }

    fn overrides() -> TableOverrides {
        let mut overrides = TableOverrides::default();
        overrides.california.insert(2023, ca_2023_override());
        overrides
    }

    // =========================================================================
    // fallback tests
    // =========================================================================

    #[test]
    fn year_without_override_returns_baseline() {
        let store = TaxTableStore::baseline();

        assert_eq!(
            store.get_year_table(Jurisdiction::Federal, 2021),
            store.tables(Jurisdiction::Federal).baseline()
        );
    }

    #[test]
    fn unsupported_year_returns_baseline() {
        let store = TaxTableStore::with_overrides(&overrides());

        assert_eq!(
            store.get_year_table(Jurisdiction::California, 1999),
            store.tables(Jurisdiction::California).baseline()
        );
        assert_eq!(
            store.get_year_table(Jurisdiction::California, 2031),
            store.tables(Jurisdiction::California).baseline()
        );
    }

    #[test]
    fn builtin_store_is_shared() {
        let first = TaxTableStore::builtin();
        let second = TaxTableStore::builtin();

        assert!(std::ptr::eq(first, second));
    }

    // =========================================================================
    // merge tests
    // =========================================================================

    #[test]
    fn override_fields_replace_baseline() {
        let store = TaxTableStore::with_overrides(&overrides());
        let table = store.get_year_table(Jurisdiction::California, 2023);

        assert_eq!(
            table.personal_exemption_credit_for(FilingStatus::Single),
            dec!(144)
        );
        // personal exemption map was replaced wholesale; joint falls back to single
        assert_eq!(
            table.personal_exemption_credit_for(FilingStatus::MarriedJoint),
            dec!(144)
        );
    }

    #[test]
    fn unspecified_fields_inherit_baseline() {
        let store = TaxTableStore::with_overrides(&overrides());
        let baseline = store.tables(Jurisdiction::California).baseline();
        let table = store.get_year_table(Jurisdiction::California, 2023);

        assert_eq!(table.brackets, baseline.brackets);
        assert_eq!(table.renters_credit, baseline.renters_credit);
    }

    #[test]
    fn override_only_affects_its_year() {
        let store = TaxTableStore::with_overrides(&overrides());

        assert_eq!(
            store.get_year_table(Jurisdiction::California, 2022),
            store.tables(Jurisdiction::California).baseline()
        );
        assert_eq!(
            store.get_year_table(Jurisdiction::Federal, 2023),
            store.tables(Jurisdiction::Federal).baseline()
        );
    }

    #[test]
    fn override_outside_supported_range_is_ignored() {
        let mut overrides = TableOverrides::default();
        overrides.california.insert(
            2025,
            YearTableOverride {
                brackets: Some(
                    BracketSchedule::new()
                        .with_status(FilingStatus::Single, vec![Bracket::unbounded(dec!(0.5))]),
                ),
                ..Default::default()
            },
        );
        overrides.federal.insert(2025, YearTableOverride::default());

        let store = TaxTableStore::with_overrides(&overrides);

        let ca_years: Vec<_> = store
            .tables(Jurisdiction::California)
            .overridden_years()
            .collect();
        let fed_years: Vec<_> = store.tables(Jurisdiction::Federal).overridden_years().collect();
        assert_eq!(ca_years, Vec::<i32>::new());
        assert_eq!(fed_years, vec![2025]);
    }

    #[test]
    fn supported_ranges_match_published_years() {
        let store = TaxTableStore::baseline();

        assert_eq!(store.tables(Jurisdiction::Federal).supported_years(), 2020..=2025);
        assert_eq!(store.tables(Jurisdiction::California).supported_years(), 2020..=2024);
        assert_eq!(store.tables(Jurisdiction::California).baseline_year(), 2024);
    }
}
