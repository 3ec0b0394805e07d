//! Deduction selection and credit resolution against a year table.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{non_negative, round_half_up};
use crate::models::{CreditName, Deductions, FilingStatus, YearTable};

/// Caller's deduction choice.
///
/// The itemized total is shared across jurisdictions; only the standard
/// deduction differs by jurisdiction and year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionSelection {
    pub use_standard: bool,
    pub itemized_total: Decimal,
}

impl DeductionSelection {
    pub fn standard() -> Self {
        Self {
            use_standard: true,
            itemized_total: Decimal::ZERO,
        }
    }

    pub fn itemized(total: Decimal) -> Self {
        Self {
            use_standard: false,
            itemized_total: total,
        }
    }
}

impl From<&Deductions> for DeductionSelection {
    /// Sums the itemized categories, treating negative entries as zero.
    fn from(deductions: &Deductions) -> Self {
        let itemized_total = deductions
            .itemized
            .categories()
            .into_iter()
            .map(non_negative)
            .sum();
        Self {
            use_standard: deductions.standard_deduction,
            itemized_total: round_half_up(itemized_total),
        }
    }
}

/// Inputs to state credits that are not part of the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditOptions {
    pub is_renter: bool,
    /// Income tested against the renter's credit limit. Taxable income is
    /// used when absent.
    pub estimated_agi: Option<Decimal>,
}

impl CreditOptions {
    pub fn renter(estimated_agi: Decimal) -> Self {
        Self {
            is_renter: true,
            estimated_agi: Some(estimated_agi),
        }
    }
}

/// Resolves deductions and credits from one jurisdiction-year table.
#[derive(Debug, Clone, Copy)]
pub struct CreditResolver<'a> {
    table: &'a YearTable,
}

impl<'a> CreditResolver<'a> {
    pub fn new(table: &'a YearTable) -> Self {
        Self { table }
    }

    /// Standard deduction for the status, or the caller's itemized total.
    pub fn deduction(
        &self,
        status: FilingStatus,
        selection: &DeductionSelection,
    ) -> Decimal {
        if selection.use_standard {
            self.table.standard_deduction_for(status)
        } else {
            selection.itemized_total
        }
    }

    pub fn personal_exemption(
        &self,
        status: FilingStatus,
    ) -> Decimal {
        self.table.personal_exemption_credit_for(status)
    }

    /// Renter's credit, granted only to renters at or under the income limit.
    pub fn renters(
        &self,
        status: FilingStatus,
        is_renter: bool,
        estimated_agi: Decimal,
    ) -> Decimal {
        if !is_renter {
            return Decimal::ZERO;
        }
        self.table
            .renters_credit
            .as_ref()
            .map_or(Decimal::ZERO, |credit| credit.credit_for(status, estimated_agi))
    }

    /// Personal exemption and renter's credits, each computed independently.
    pub fn state_credits(
        &self,
        status: FilingStatus,
        taxable_income: Decimal,
        options: &CreditOptions,
    ) -> BTreeMap<CreditName, Decimal> {
        let estimated_agi = options.estimated_agi.unwrap_or(taxable_income);

        let mut credits = BTreeMap::new();
        credits.insert(CreditName::PersonalExemption, self.personal_exemption(status));
        credits.insert(
            CreditName::Renters,
            self.renters(status, options.is_renter, estimated_agi),
        );
        credits
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{ItemizedDeductions, RentersCredit, UpperBound};
    use crate::tables::builtin::{california_2024, federal_2024};

    fn limited_renters_table() -> YearTable {
        let mut table = california_2024();
        table.renters_credit = Some(RentersCredit {
            amount: [(FilingStatus::Single, dec!(60))].into_iter().collect(),
            income_limit: [(FilingStatus::Single, UpperBound::Bounded(dec!(50746)))]
                .into_iter()
                .collect(),
        });
        table
    }

    // =========================================================================
    // deduction tests
    // =========================================================================

    #[test]
    fn deduction_uses_standard_amount_for_jurisdiction() {
        let federal = federal_2024();
        let california = california_2024();
        let selection = DeductionSelection::standard();

        assert_eq!(
            CreditResolver::new(&federal).deduction(FilingStatus::HeadHousehold, &selection),
            dec!(21900)
        );
        assert_eq!(
            CreditResolver::new(&california).deduction(FilingStatus::HeadHousehold, &selection),
            dec!(10726)
        );
    }

    #[test]
    fn itemized_total_is_shared_across_jurisdictions() {
        let federal = federal_2024();
        let california = california_2024();
        let selection = DeductionSelection::itemized(dec!(18250.75));

        assert_eq!(
            CreditResolver::new(&federal).deduction(FilingStatus::Single, &selection),
            dec!(18250.75)
        );
        assert_eq!(
            CreditResolver::new(&california).deduction(FilingStatus::Single, &selection),
            dec!(18250.75)
        );
    }

    #[test]
    fn itemized_selection_may_be_below_standard() {
        let table = federal_2024();
        let selection = DeductionSelection::itemized(dec!(100));

        assert_eq!(
            CreditResolver::new(&table).deduction(FilingStatus::Single, &selection),
            dec!(100)
        );
    }

    #[test]
    fn selection_from_deductions_sums_categories() {
        let deductions = Deductions {
            standard_deduction: false,
            itemized: ItemizedDeductions {
                charitable_contributions: dec!(1500),
                mortgage_interest: dec!(12000),
                state_local_taxes: dec!(-250),
                medical_expenses: dec!(800.40),
            },
        };

        let selection = DeductionSelection::from(&deductions);

        assert_eq!(selection, DeductionSelection::itemized(dec!(14300.40)));
    }

    // =========================================================================
    // credit tests
    // =========================================================================

    #[test]
    fn personal_exemption_by_status() {
        let table = california_2024();
        let resolver = CreditResolver::new(&table);

        assert_eq!(resolver.personal_exemption(FilingStatus::Single), dec!(146));
        assert_eq!(resolver.personal_exemption(FilingStatus::QualifyingWidow), dec!(292));
    }

    #[test]
    fn renters_credit_requires_renter_flag() {
        let table = california_2024();
        let resolver = CreditResolver::new(&table);

        assert_eq!(resolver.renters(FilingStatus::Single, false, dec!(1000)), dec!(0));
        assert_eq!(resolver.renters(FilingStatus::Single, true, dec!(1000)), dec!(60));
        assert_eq!(resolver.renters(FilingStatus::MarriedJoint, true, dec!(1000)), dec!(120));
    }

    #[test]
    fn renters_credit_zero_above_income_limit() {
        let table = limited_renters_table();
        let resolver = CreditResolver::new(&table);

        assert_eq!(resolver.renters(FilingStatus::Single, true, dec!(50746)), dec!(60));
        assert_eq!(resolver.renters(FilingStatus::Single, true, dec!(50747)), dec!(0));
    }

    #[test]
    fn renters_credit_zero_without_renters_table() {
        let table = federal_2024();

        assert_eq!(
            CreditResolver::new(&table).renters(FilingStatus::Single, true, dec!(0)),
            dec!(0)
        );
    }

    #[test]
    fn state_credits_default_agi_to_taxable_income() {
        let table = limited_renters_table();
        let resolver = CreditResolver::new(&table);
        let options = CreditOptions {
            is_renter: true,
            estimated_agi: None,
        };

        let under = resolver.state_credits(FilingStatus::Single, dec!(40000), &options);
        let over = resolver.state_credits(FilingStatus::Single, dec!(60000), &options);

        assert_eq!(under[&CreditName::Renters], dec!(60));
        assert_eq!(over[&CreditName::Renters], dec!(0));
        assert_eq!(over[&CreditName::PersonalExemption], dec!(146));
    }

    #[test]
    fn state_credits_prefer_supplied_agi() {
        let table = limited_renters_table();
        let resolver = CreditResolver::new(&table);

        let credits = resolver.state_credits(
            FilingStatus::Single,
            dec!(40000),
            &CreditOptions::renter(dec!(90000)),
        );

        assert_eq!(credits[&CreditName::Renters], dec!(0));
    }
}
