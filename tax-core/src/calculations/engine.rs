//! Per-jurisdiction tax engines.
//!
//! Each engine resolves the year table, picks the bracket list for the filing
//! status (qualifying widow(er) uses married-joint), computes tax before
//! credits, applies the jurisdiction's credits and returns a [`TaxResult`].
//! Engines borrow an immutable [`TaxTableStore`] and hold no other state, so
//! they can be shared freely across threads.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{CaliforniaEngine, CreditOptions, JurisdictionEngine};
//! use tax_core::{CreditName, FilingStatus, TaxTableStore};
//!
//! let engine = CaliforniaEngine::new(TaxTableStore::builtin());
//! let result = engine.compute_tax(2024, dec!(60000), FilingStatus::Single, &CreditOptions::default());
//!
//! assert_eq!(result.before_credits, dec!(2341));
//! assert_eq!(result.credit(CreditName::PersonalExemption), dec!(146));
//! assert_eq!(result.after_credits, dec!(2195));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::credits::{CreditOptions, CreditResolver, DeductionSelection};
use super::progressive::{ProgressiveTax, Surtax};
use crate::models::{FilingStatus, Jurisdiction, TaxResult, YearTable};
use crate::tables::TaxTableStore;

/// Common surface of the federal and state engines.
pub trait JurisdictionEngine: Send + Sync {
    fn jurisdiction(&self) -> Jurisdiction;

    fn store(&self) -> &TaxTableStore;

    /// Tax before credits, rounded to whole dollars.
    fn tax_before_credits(
        &self,
        year: i32,
        taxable_income: Decimal,
        status: FilingStatus,
    ) -> Decimal;

    fn compute_tax(
        &self,
        year: i32,
        taxable_income: Decimal,
        status: FilingStatus,
        options: &CreditOptions,
    ) -> TaxResult;

    fn year_table(
        &self,
        year: i32,
    ) -> &YearTable {
        self.store().get_year_table(self.jurisdiction(), year)
    }

    fn standard_deduction(
        &self,
        year: i32,
        status: FilingStatus,
    ) -> Decimal {
        self.year_table(year).standard_deduction_for(status)
    }

    /// Deduction amount for this jurisdiction under the caller's selection.
    fn deduction(
        &self,
        year: i32,
        status: FilingStatus,
        selection: &DeductionSelection,
    ) -> Decimal {
        CreditResolver::new(self.year_table(year)).deduction(status, selection)
    }
}

/// Federal income tax. No credits are modeled, so tax after credits always
/// equals tax before credits.
#[derive(Debug, Clone, Copy)]
pub struct FederalEngine<'a> {
    store: &'a TaxTableStore,
}

impl<'a> FederalEngine<'a> {
    pub fn new(store: &'a TaxTableStore) -> Self {
        Self { store }
    }
}

impl JurisdictionEngine for FederalEngine<'_> {
    fn jurisdiction(&self) -> Jurisdiction {
        Jurisdiction::Federal
    }

    fn store(&self) -> &TaxTableStore {
        self.store
    }

    fn tax_before_credits(
        &self,
        year: i32,
        taxable_income: Decimal,
        status: FilingStatus,
    ) -> Decimal {
        let brackets = self.year_table(year).brackets.for_status(status);
        ProgressiveTax::new(brackets).tax_before_credits(taxable_income)
    }

    fn compute_tax(
        &self,
        year: i32,
        taxable_income: Decimal,
        status: FilingStatus,
        _options: &CreditOptions,
    ) -> TaxResult {
        let before_credits = self.tax_before_credits(year, taxable_income, status);
        trace!(year, %taxable_income, %status, %before_credits, "federal tax computed");
        TaxResult::without_credits(before_credits)
    }
}

/// California personal income tax, including the Mental Health Services Tax
/// and the personal exemption and renter's credits.
#[derive(Debug, Clone, Copy)]
pub struct CaliforniaEngine<'a> {
    store: &'a TaxTableStore,
}

impl<'a> CaliforniaEngine<'a> {
    pub fn new(store: &'a TaxTableStore) -> Self {
        Self { store }
    }

    pub fn personal_exemption_credit(
        &self,
        year: i32,
        status: FilingStatus,
    ) -> Decimal {
        CreditResolver::new(self.year_table(year)).personal_exemption(status)
    }

    pub fn renters_credit(
        &self,
        year: i32,
        status: FilingStatus,
        is_renter: bool,
        estimated_agi: Decimal,
    ) -> Decimal {
        CreditResolver::new(self.year_table(year)).renters(status, is_renter, estimated_agi)
    }
}

impl JurisdictionEngine for CaliforniaEngine<'_> {
    fn jurisdiction(&self) -> Jurisdiction {
        Jurisdiction::California
    }

    fn store(&self) -> &TaxTableStore {
        self.store
    }

    fn tax_before_credits(
        &self,
        year: i32,
        taxable_income: Decimal,
        status: FilingStatus,
    ) -> Decimal {
        let brackets = self.year_table(year).brackets.for_status(status);
        ProgressiveTax::new(brackets)
            .with_surtax(Surtax::MENTAL_HEALTH_SERVICES)
            .tax_before_credits(taxable_income)
    }

    fn compute_tax(
        &self,
        year: i32,
        taxable_income: Decimal,
        status: FilingStatus,
        options: &CreditOptions,
    ) -> TaxResult {
        let before_credits = self.tax_before_credits(year, taxable_income, status);
        let credits = CreditResolver::new(self.year_table(year)).state_credits(
            status,
            taxable_income,
            options,
        );
        let result = TaxResult::new(before_credits, credits);
        trace!(
            year,
            %taxable_income,
            %status,
            %before_credits,
            after_credits = %result.after_credits,
            "california tax computed"
        );
        result
    }
}

/// Taxable income for each jurisdiction plus the state credit options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRequest {
    pub year: i32,
    pub filing_status: FilingStatus,
    pub federal_taxable_income: Decimal,
    pub california_taxable_income: Decimal,
    #[serde(default)]
    pub ca_options: CreditOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionResults {
    pub federal: TaxResult,
    pub california: TaxResult,
}

impl JurisdictionResults {
    pub fn total_after_credits(&self) -> Decimal {
        self.federal.after_credits + self.california.after_credits
    }
}

/// Both jurisdiction engines over one table store.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    federal: FederalEngine<'a>,
    california: CaliforniaEngine<'a>,
}

impl<'a> TaxEngine<'a> {
    pub fn new(store: &'a TaxTableStore) -> Self {
        Self {
            federal: FederalEngine::new(store),
            california: CaliforniaEngine::new(store),
        }
    }

    pub fn federal(&self) -> &FederalEngine<'a> {
        &self.federal
    }

    pub fn california(&self) -> &CaliforniaEngine<'a> {
        &self.california
    }

    pub fn engine(
        &self,
        jurisdiction: Jurisdiction,
    ) -> &dyn JurisdictionEngine {
        match jurisdiction {
            Jurisdiction::Federal => &self.federal,
            Jurisdiction::California => &self.california,
        }
    }

    /// Evaluates both jurisdictions. The two computations are independent.
    pub fn compute(
        &self,
        request: &TaxRequest,
    ) -> JurisdictionResults {
        JurisdictionResults {
            federal: self.federal.compute_tax(
                request.year,
                request.federal_taxable_income,
                request.filing_status,
                &CreditOptions::default(),
            ),
            california: self.california.compute_tax(
                request.year,
                request.california_taxable_income,
                request.filing_status,
                &request.ca_options,
            ),
        }
    }
}

impl Default for TaxEngine<'static> {
    fn default() -> Self {
        Self::new(TaxTableStore::builtin())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Bracket, BracketSchedule, CreditName, YearTableOverride};
    use crate::tables::TableOverrides;

    fn engine() -> TaxEngine<'static> {
        TaxEngine::default()
    }

    fn not_renter() -> CreditOptions {
        CreditOptions::default()
    }

    // =========================================================================
    // federal tests
    // =========================================================================

    #[test]
    fn federal_at_first_bracket_boundary() {
        let result =
            engine()
                .federal()
                .compute_tax(2024, dec!(11600), FilingStatus::Single, &not_renter());

        assert_eq!(result.before_credits, dec!(1160));
        assert_eq!(result.after_credits, dec!(1160));
        assert!(result.credits.is_empty());
    }

    #[test]
    fn federal_single_three_brackets() {
        // 1160 + 35550 * 0.12 + 52850 * 0.22
        let tax = engine()
            .federal()
            .tax_before_credits(2024, dec!(100000), FilingStatus::Single);

        assert_eq!(tax, dec!(17053));
    }

    #[test]
    fn federal_ignores_renter_option() {
        let result = engine().federal().compute_tax(
            2024,
            dec!(50000),
            FilingStatus::Single,
            &CreditOptions::renter(dec!(50000)),
        );

        assert_eq!(result.after_credits, result.before_credits);
    }

    #[test]
    fn federal_standard_deduction_by_year_and_status() {
        let engine = engine();

        assert_eq!(
            engine.federal().standard_deduction(2024, FilingStatus::MarriedJoint),
            dec!(29200)
        );
        assert_eq!(
            engine.federal().standard_deduction(2022, FilingStatus::Single),
            dec!(14600)
        );
    }

    // =========================================================================
    // california tests
    // =========================================================================

    #[test]
    fn california_single_60000_not_renter() {
        let result =
            engine()
                .california()
                .compute_tax(2024, dec!(60000), FilingStatus::Single, &not_renter());

        assert_eq!(result.before_credits, dec!(2341));
        assert_eq!(result.credit(CreditName::PersonalExemption), dec!(146));
        assert_eq!(result.credit(CreditName::Renters), dec!(0));
        assert_eq!(result.after_credits, dec!(2195));
    }

    #[test]
    fn california_renter_gets_both_credits() {
        let result = engine().california().compute_tax(
            2024,
            dec!(60000),
            FilingStatus::Single,
            &CreditOptions::renter(dec!(65000)),
        );

        assert_eq!(result.credit(CreditName::Renters), dec!(60));
        assert_eq!(result.after_credits, dec!(2135));
    }

    #[test]
    fn california_surtax_on_income_over_one_million() {
        let california = *engine().california();

        let result = california.compute_tax(2024, dec!(1200000), FilingStatus::Single, &not_renter());

        assert_eq!(result.before_credits, dec!(131540));
        assert_eq!(result.after_credits, dec!(131394));
    }

    #[test]
    fn california_credits_floor_at_zero() {
        let result = engine().california().compute_tax(
            2024,
            dec!(5000),
            FilingStatus::MarriedJoint,
            &CreditOptions::renter(dec!(5000)),
        );

        // 5000 * 0.01 = 50, credits 292 + 120
        assert_eq!(result.before_credits, dec!(50));
        assert_eq!(result.total_credits(), dec!(412));
        assert_eq!(result.after_credits, dec!(0));
    }

    #[test]
    fn california_married_separate_taxed_on_single_schedule() {
        let california = *engine().california();

        assert_eq!(
            california.tax_before_credits(2024, dec!(80000), FilingStatus::MarriedSeparate),
            california.tax_before_credits(2024, dec!(80000), FilingStatus::Single)
        );
    }

    #[test]
    fn california_standalone_credit_lookups() {
        let california = *engine().california();

        assert_eq!(
            california.personal_exemption_credit(2021, FilingStatus::HeadHousehold),
            dec!(292)
        );
        assert_eq!(
            california.renters_credit(2024, FilingStatus::MarriedSeparate, true, dec!(10)),
            dec!(60)
        );
        assert_eq!(
            california.renters_credit(2024, FilingStatus::MarriedSeparate, false, dec!(10)),
            dec!(0)
        );
    }

    // =========================================================================
    // shared properties
    // =========================================================================

    #[test]
    fn zero_income_is_zero_tax_everywhere() {
        let engine = engine();
        for jurisdiction in [Jurisdiction::Federal, Jurisdiction::California] {
            for status in FilingStatus::ALL {
                let result =
                    engine
                        .engine(jurisdiction)
                        .compute_tax(2024, dec!(0), status, &not_renter());
                assert_eq!(result.before_credits, dec!(0), "{jurisdiction} {status}");
                assert_eq!(result.after_credits, dec!(0), "{jurisdiction} {status}");
            }
        }
    }

    #[test]
    fn every_status_is_taxed_in_both_jurisdictions() {
        let engine = engine();

        for jurisdiction in [Jurisdiction::Federal, Jurisdiction::California] {
            for status in FilingStatus::ALL {
                let tax = engine
                    .engine(jurisdiction)
                    .tax_before_credits(2024, dec!(100000), status);

                assert!(tax > Decimal::ZERO, "{jurisdiction} {status} taxed at zero");
            }
        }
    }

    #[test]
    fn qualifying_widow_matches_married_joint() {
        let engine = engine();
        for jurisdiction in [Jurisdiction::Federal, Jurisdiction::California] {
            for income in [dec!(15000), dec!(250000), dec!(2000000)] {
                let engine = engine.engine(jurisdiction);
                assert_eq!(
                    engine.tax_before_credits(2024, income, FilingStatus::QualifyingWidow),
                    engine.tax_before_credits(2024, income, FilingStatus::MarriedJoint),
                    "{jurisdiction} {income}"
                );
            }
        }
    }

    #[test]
    fn absent_year_matches_baseline_year() {
        let engine = engine();
        for jurisdiction in [Jurisdiction::Federal, Jurisdiction::California] {
            let engine = engine.engine(jurisdiction);
            for year in [2020, 2023, 1987, 2040] {
                assert_eq!(
                    engine.compute_tax(year, dec!(87500), FilingStatus::HeadHousehold, &not_renter()),
                    engine.compute_tax(2024, dec!(87500), FilingStatus::HeadHousehold, &not_renter()),
                    "{jurisdiction} {year}"
                );
            }
        }
    }

    #[test]
    fn override_year_uses_its_own_brackets() {
        let mut overrides = TableOverrides::default();
        overrides.federal.insert(
            2025,
            YearTableOverride {
                brackets: Some(BracketSchedule::new().with_status(
                    FilingStatus::Single,
                    vec![
                        Bracket::bounded(dec!(11925), dec!(0.10)),
                        Bracket::unbounded(dec!(0.12)),
                    ],
                )),
                ..Default::default()
            },
        );
        let store = TaxTableStore::with_overrides(&overrides);
        let engine = TaxEngine::new(&store);

        assert_eq!(
            engine.federal().tax_before_credits(2025, dec!(11925), FilingStatus::Single),
            dec!(1193)
        );
        // replaced schedule has no married-joint entry, so it falls back to single
        assert_eq!(
            engine.federal().tax_before_credits(2025, dec!(11925), FilingStatus::MarriedJoint),
            dec!(1193)
        );
        assert_eq!(
            engine.federal().tax_before_credits(2024, dec!(11925), FilingStatus::Single),
            dec!(1199)
        );
    }

    #[test]
    fn compute_combines_both_jurisdictions() {
        let request = TaxRequest {
            year: 2024,
            filing_status: FilingStatus::Single,
            federal_taxable_income: dec!(11600),
            california_taxable_income: dec!(60000),
            ca_options: CreditOptions::default(),
        };

        let results = engine().compute(&request);

        assert_eq!(results.federal.after_credits, dec!(1160));
        assert_eq!(results.california.after_credits, dec!(2195));
        assert_eq!(results.total_after_credits(), dec!(3355));
    }

    #[test]
    fn concurrent_calls_agree() {
        let request = TaxRequest {
            year: 2024,
            filing_status: FilingStatus::MarriedJoint,
            federal_taxable_income: dec!(180000),
            california_taxable_income: dec!(195000),
            ca_options: CreditOptions::renter(dec!(210000)),
        };
        let expected = engine().compute(&request);

        let results: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| engine().compute(&request)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for result in results {
            assert_eq!(result, expected);
        }
    }

    proptest! {
        #[test]
        fn after_credits_never_negative(cents in 0u64..50_000_000, renter in any::<bool>(), status_index in 0usize..5) {
            let status = FilingStatus::ALL[status_index];
            let income = Decimal::new(cents as i64, 2);
            let options = CreditOptions { is_renter: renter, estimated_agi: None };

            let result = engine().california().compute_tax(2024, income, status, &options);

            prop_assert!(result.after_credits >= Decimal::ZERO);
            prop_assert!(result.after_credits <= result.before_credits);
        }

        #[test]
        fn tax_before_credits_monotonic_everywhere(
            a in 0u64..300_000_000,
            b in 0u64..300_000_000,
            california in any::<bool>(),
            status_index in 0usize..5,
            year in 2019i32..=2026,
        ) {
            let jurisdiction = if california { Jurisdiction::California } else { Jurisdiction::Federal };
            let status = FilingStatus::ALL[status_index];
            let tax_engine = engine();
            let calculator = tax_engine.engine(jurisdiction);
            let (low, high) = if a <= b { (a, b) } else { (b, a) };

            let low_tax = calculator.tax_before_credits(year, Decimal::new(low as i64, 2), status);
            let high_tax = calculator.tax_before_credits(year, Decimal::new(high as i64, 2), status);

            prop_assert!(low_tax >= Decimal::ZERO);
            prop_assert!(low_tax <= high_tax);
        }
    }
}
