use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BracketSchedule, FilingStatus, UpperBound};

/// Flat amounts keyed by filing status (standard deductions, credits).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusAmounts<T = Decimal>(BTreeMap<FilingStatus, T>);

impl<T> Default for StatusAmounts<T> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<T: Copy> StatusAmounts<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        status: FilingStatus,
    ) -> Option<T> {
        self.0.get(&status).copied()
    }

    /// Value for `status`, or the single value when the status is missing.
    pub fn get_or_single(
        &self,
        status: FilingStatus,
    ) -> Option<T> {
        self.get(status).or_else(|| {
            debug!(%status, "no amount for status, using single");
            self.get(FilingStatus::Single)
        })
    }
}

impl<T> FromIterator<(FilingStatus, T)> for StatusAmounts<T> {
    fn from_iter<I: IntoIterator<Item = (FilingStatus, T)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Renter's credit parameters for one year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentersCredit {
    pub amount: StatusAmounts,
    pub income_limit: StatusAmounts<UpperBound>,
}

impl RentersCredit {
    /// Credit for `status` at `estimated_agi`.
    ///
    /// A missing income limit means no limit; a missing amount means no credit.
    pub fn credit_for(
        &self,
        status: FilingStatus,
        estimated_agi: Decimal,
    ) -> Decimal {
        let limit = self
            .income_limit
            .get(status)
            .unwrap_or(UpperBound::Unbounded);
        if !limit.admits(estimated_agi) {
            return Decimal::ZERO;
        }
        self.amount.get(status).unwrap_or(Decimal::ZERO)
    }
}

/// Everything one jurisdiction needs to compute tax for one year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTable {
    pub brackets: BracketSchedule,
    pub standard_deduction: StatusAmounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_exemption_credit: Option<StatusAmounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renters_credit: Option<RentersCredit>,
}

impl YearTable {
    /// Standard deduction for `status`, falling back to single and then zero.
    pub fn standard_deduction_for(
        &self,
        status: FilingStatus,
    ) -> Decimal {
        self.standard_deduction
            .get_or_single(status)
            .unwrap_or(Decimal::ZERO)
    }

    /// Personal exemption credit for `status`, zero when the jurisdiction has none.
    pub fn personal_exemption_credit_for(
        &self,
        status: FilingStatus,
    ) -> Decimal {
        self.personal_exemption_credit
            .as_ref()
            .and_then(|credits| credits.get_or_single(status))
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns a copy of this table with every field present in `patch`
    /// replaced wholesale.
    ///
    /// Fields are not merged by filing status: an override that supplies
    /// `standard_deduction` must supply every status it wants to keep.
    pub fn merged_with(
        &self,
        patch: &YearTableOverride,
    ) -> YearTable {
        YearTable {
            brackets: patch
                .brackets
                .clone()
                .unwrap_or_else(|| self.brackets.clone()),
            standard_deduction: patch
                .standard_deduction
                .clone()
                .unwrap_or_else(|| self.standard_deduction.clone()),
            personal_exemption_credit: patch
                .personal_exemption_credit
                .clone()
                .or_else(|| self.personal_exemption_credit.clone()),
            renters_credit: patch
                .renters_credit
                .clone()
                .or_else(|| self.renters_credit.clone()),
        }
    }
}

/// Partial year table as it appears in an override document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTableOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brackets: Option<BracketSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_deduction: Option<StatusAmounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_exemption_credit: Option<StatusAmounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renters_credit: Option<RentersCredit>,
}

impl YearTableOverride {
    pub fn is_empty(&self) -> bool {
        self.brackets.is_none()
            && self.standard_deduction.is_none()
            && self.personal_exemption_credit.is_none()
            && self.renters_credit.is_none()
    }
}
