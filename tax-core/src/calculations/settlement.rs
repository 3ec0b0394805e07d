//! Settlement of a completed interview.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Total income: sum of income sources (negatives read as zero) |
//! | 2    | Deduction per jurisdiction: standard for the year/status, or the shared itemized total |
//! | 3    | Federal taxable income: max(0, line 1 - federal deduction) |
//! | 4    | California taxable income: max(0, line 1 - CA deduction + CA adjustments) |
//! | 5    | Federal tax via the federal engine |
//! | 6    | California tax via the CA engine (renter flag, AGI estimated as line 1) |
//! | 7    | Total tax: line 5 + line 6 after credits |
//! | 8    | Refund or amount due per jurisdiction: withholding - tax after credits |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::ReturnSettlement;
//! use tax_core::{FilingStatus, ReturnInput, TaxTableStore};
//!
//! let mut input = ReturnInput::new(2024, FilingStatus::Single);
//! input.income.wages = dec!(74600);
//! input.federal.withholding = dec!(9000);
//! input.california.ca_withholding = dec!(2000);
//!
//! let settled = ReturnSettlement::new(TaxTableStore::builtin()).settle(&input);
//!
//! assert_eq!(settled.taxable_income.federal, dec!(60000));
//! assert_eq!(settled.federal.after_credits, dec!(8253));
//! assert_eq!(settled.federal_refund_or_due, dec!(747));
//! ```

use rust_decimal::Decimal;
use tracing::info;

use super::common::{non_negative, round_half_up};
use super::credits::{CreditOptions, DeductionSelection};
use super::engine::{JurisdictionEngine, TaxEngine, TaxRequest};
use crate::models::{CalculatedTax, IncomeInfo, ReturnInput, TaxableIncome};
use crate::tables::TaxTableStore;

/// Runs both jurisdiction engines for a [`ReturnInput`].
#[derive(Debug, Clone, Copy)]
pub struct ReturnSettlement<'a> {
    engine: TaxEngine<'a>,
}

impl<'a> ReturnSettlement<'a> {
    pub fn new(store: &'a TaxTableStore) -> Self {
        Self {
            engine: TaxEngine::new(store),
        }
    }

    pub fn settle(
        &self,
        input: &ReturnInput,
    ) -> CalculatedTax {
        let year = input.tax_year;
        let status = input.filing_status;

        let total_income = self.total_income(&input.income);
        let selection = DeductionSelection::from(&input.deductions);

        let federal_deduction = self.engine.federal().deduction(year, status, &selection);
        let california_deduction = self.engine.california().deduction(year, status, &selection);

        let taxable_income = TaxableIncome {
            federal: self.taxable_income(total_income, federal_deduction, Decimal::ZERO),
            california: self.taxable_income(
                total_income,
                california_deduction,
                input.california.adjustments,
            ),
        };

        let request = TaxRequest {
            year,
            filing_status: status,
            federal_taxable_income: taxable_income.federal,
            california_taxable_income: taxable_income.california,
            ca_options: CreditOptions {
                is_renter: input.california.renters_credit,
                estimated_agi: Some(total_income),
            },
        };
        let results = self.engine.compute(&request);

        let federal_refund_or_due =
            self.refund_or_due(input.federal.withholding, results.federal.after_credits);
        let california_refund_or_due = self.refund_or_due(
            input.california.ca_withholding,
            results.california.after_credits,
        );
        let total_tax = results.total_after_credits();

        info!(
            year,
            %status,
            %total_income,
            federal_tax = %results.federal.after_credits,
            california_tax = %results.california.after_credits,
            "return settled"
        );

        CalculatedTax {
            tax_year: year,
            filing_status: status,
            total_income,
            taxable_income,
            federal: results.federal,
            california: results.california,
            total_tax,
            federal_refund_or_due,
            california_refund_or_due,
            net_refund_or_due: federal_refund_or_due + california_refund_or_due,
        }
    }

    /// Sums income sources, reading negative entries as zero.
    fn total_income(
        &self,
        income: &IncomeInfo,
    ) -> Decimal {
        round_half_up(income.sources().into_iter().map(non_negative).sum())
    }

    /// Income less deduction plus a signed adjustment, floored at zero.
    fn taxable_income(
        &self,
        total_income: Decimal,
        deduction: Decimal,
        adjustments: Decimal,
    ) -> Decimal {
        non_negative(round_half_up(total_income - deduction + adjustments))
    }

    /// Positive for a refund, negative for an amount due.
    fn refund_or_due(
        &self,
        withholding: Decimal,
        tax_after_credits: Decimal,
    ) -> Decimal {
        round_half_up(non_negative(withholding) - tax_after_credits)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{CreditName, FilingStatus, ItemizedDeductions};

    fn settlement() -> ReturnSettlement<'static> {
        ReturnSettlement::new(TaxTableStore::builtin())
    }

    fn single_return() -> ReturnInput {
        let mut input = ReturnInput::new(2024, FilingStatus::Single);
        input.income.wages = dec!(60000);
        input.income.interest = dec!(1200);
        input.income.dividends = dec!(4163);
        input
    }

    // =========================================================================
    // step tests
    // =========================================================================

    #[test]
    fn total_income_sums_sources() {
        let income = single_return().income;

        assert_eq!(settlement().total_income(&income), dec!(65363));
    }

    #[test]
    fn total_income_ignores_negative_sources() {
        let income = IncomeInfo {
            wages: dec!(50000),
            capital_gains: dec!(-3000),
            ..Default::default()
        };

        assert_eq!(settlement().total_income(&income), dec!(50000));
    }

    #[test]
    fn taxable_income_applies_signed_adjustment() {
        let s = settlement();

        assert_eq!(s.taxable_income(dec!(65363), dec!(5363), dec!(-1000)), dec!(59000));
        assert_eq!(s.taxable_income(dec!(65363), dec!(5363), dec!(250.50)), dec!(60250.50));
    }

    #[test]
    fn taxable_income_floors_at_zero() {
        assert_eq!(
            settlement().taxable_income(dec!(4000), dec!(14600), dec!(0)),
            dec!(0)
        );
    }

    #[test]
    fn refund_or_due_sign() {
        let s = settlement();

        assert_eq!(s.refund_or_due(dec!(3000), dec!(2195)), dec!(805));
        assert_eq!(s.refund_or_due(dec!(0), dec!(2195)), dec!(-2195));
        assert_eq!(s.refund_or_due(dec!(-50), dec!(100)), dec!(-100));
    }

    // =========================================================================
    // settle tests
    // =========================================================================

    #[test]
    fn settle_standard_deduction_per_jurisdiction() {
        let result = settlement().settle(&single_return());

        assert_eq!(result.total_income, dec!(65363));
        assert_eq!(result.taxable_income.federal, dec!(50763));
        assert_eq!(result.taxable_income.california, dec!(60000));
        assert_eq!(result.california.before_credits, dec!(2341));
        assert_eq!(result.california.after_credits, dec!(2195));
    }

    #[test]
    fn settle_federal_tax_uses_brackets() {
        let result = settlement().settle(&single_return());

        // 1160 + 35550 * 0.12 + 3613 * 0.22 = 6220.86
        assert_eq!(result.federal.before_credits, dec!(6221));
        assert_eq!(result.total_tax, dec!(8416));
    }

    #[test]
    fn settle_itemized_total_shared_by_both_jurisdictions() {
        let mut input = single_return();
        input.deductions.standard_deduction = false;
        input.deductions.itemized = ItemizedDeductions {
            mortgage_interest: dec!(15000),
            charitable_contributions: dec!(363),
            ..Default::default()
        };

        let result = settlement().settle(&input);

        assert_eq!(result.taxable_income.federal, dec!(50000));
        assert_eq!(result.taxable_income.california, dec!(50000));
    }

    #[test]
    fn settle_renter_credit_tested_against_total_income() {
        let mut input = single_return();
        input.california.renters_credit = true;

        let result = settlement().settle(&input);

        assert_eq!(result.california.credit(CreditName::Renters), dec!(60));
        assert_eq!(result.california.after_credits, dec!(2135));
    }

    #[test]
    fn settle_refund_and_due() {
        let mut input = single_return();
        input.federal.withholding = dec!(7000);
        input.california.ca_withholding = dec!(1500);

        let result = settlement().settle(&input);

        assert_eq!(result.federal_refund_or_due, dec!(779));
        assert_eq!(result.california_refund_or_due, dec!(-695));
        assert_eq!(result.net_refund_or_due, dec!(84));
        assert!(result.is_refund());
    }

    #[test]
    fn settle_empty_return_owes_nothing() {
        let result = settlement().settle(&ReturnInput::new(2030, FilingStatus::HeadHousehold));

        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.net_refund_or_due, dec!(0));
        assert!(!result.is_refund());
    }
}
