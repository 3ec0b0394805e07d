//! Interview data handed to the settlement step, and the record it produces.
//!
//! Every amount is optional on the wire: missing or `null` values read as
//! zero so partially completed interviews can still be settled.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::filing_status::deserialize_lenient;
use super::{FilingStatus, TaxResult};

fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Decimal>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_true() -> bool {
    true
}

fn default_months_in_ca() -> u8 {
    12
}

/// Income sources from the income step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeInfo {
    #[serde(deserialize_with = "amount")]
    pub wages: Decimal,
    #[serde(deserialize_with = "amount")]
    pub interest: Decimal,
    #[serde(deserialize_with = "amount")]
    pub dividends: Decimal,
    #[serde(deserialize_with = "amount")]
    pub business_income: Decimal,
    #[serde(deserialize_with = "amount")]
    pub capital_gains: Decimal,
    #[serde(deserialize_with = "amount")]
    pub other_income: Decimal,
}

impl IncomeInfo {
    pub fn sources(&self) -> [Decimal; 6] {
        [
            self.wages,
            self.interest,
            self.dividends,
            self.business_income,
            self.capital_gains,
            self.other_income,
        ]
    }
}

/// Itemized deduction categories from the deductions step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemizedDeductions {
    #[serde(deserialize_with = "amount")]
    pub charitable_contributions: Decimal,
    #[serde(deserialize_with = "amount")]
    pub mortgage_interest: Decimal,
    #[serde(deserialize_with = "amount")]
    pub state_local_taxes: Decimal,
    #[serde(deserialize_with = "amount")]
    pub medical_expenses: Decimal,
}

impl ItemizedDeductions {
    pub fn categories(&self) -> [Decimal; 4] {
        [
            self.charitable_contributions,
            self.mortgage_interest,
            self.state_local_taxes,
            self.medical_expenses,
        ]
    }
}

/// Standard-or-itemized choice plus the itemized categories.
///
/// The same itemized total is used for every jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    #[serde(default = "default_true")]
    pub standard_deduction: bool,
    #[serde(flatten)]
    pub itemized: ItemizedDeductions,
}

impl Default for Deductions {
    fn default() -> Self {
        Self {
            standard_deduction: true,
            itemized: ItemizedDeductions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FederalInfo {
    #[serde(deserialize_with = "amount")]
    pub withholding: Decimal,
}

/// California step data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaliforniaInfo {
    #[serde(default = "default_true")]
    pub resident: bool,
    #[serde(default = "default_months_in_ca")]
    pub months_in_ca: u8,
    #[serde(default, deserialize_with = "amount")]
    pub ca_withholding: Decimal,
    #[serde(default, deserialize_with = "amount")]
    pub sdi_withheld: Decimal,
    /// Signed adjustment added to California taxable income.
    #[serde(default, deserialize_with = "amount")]
    pub adjustments: Decimal,
    #[serde(default)]
    pub renters_credit: bool,
}

impl Default for CaliforniaInfo {
    fn default() -> Self {
        Self {
            resident: true,
            months_in_ca: default_months_in_ca(),
            ca_withholding: Decimal::ZERO,
            sdi_withheld: Decimal::ZERO,
            adjustments: Decimal::ZERO,
            renters_credit: false,
        }
    }
}

/// A completed interview, ready to settle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnInput {
    pub tax_year: i32,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub filing_status: FilingStatus,
    #[serde(default, alias = "income_info")]
    pub income: IncomeInfo,
    #[serde(default)]
    pub deductions: Deductions,
    #[serde(default)]
    pub federal: FederalInfo,
    #[serde(default, alias = "ca")]
    pub california: CaliforniaInfo,
}

impl ReturnInput {
    pub fn new(
        tax_year: i32,
        filing_status: FilingStatus,
    ) -> Self {
        Self {
            tax_year,
            filing_status,
            income: IncomeInfo::default(),
            deductions: Deductions::default(),
            federal: FederalInfo::default(),
            california: CaliforniaInfo::default(),
        }
    }
}

/// Taxable income per jurisdiction after deductions and adjustments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxableIncome {
    pub federal: Decimal,
    pub california: Decimal,
}

/// Settlement record persisted with the return as `calculated_tax`.
///
/// Refund fields are withholding minus tax after credits: positive values
/// are refunds, negative values are amounts due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedTax {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub total_income: Decimal,
    pub taxable_income: TaxableIncome,
    pub federal: TaxResult,
    pub california: TaxResult,
    pub total_tax: Decimal,
    pub federal_refund_or_due: Decimal,
    pub california_refund_or_due: Decimal,
    pub net_refund_or_due: Decimal,
}

impl CalculatedTax {
    pub fn is_refund(&self) -> bool {
        self.net_refund_or_due > Decimal::ZERO
    }
}
