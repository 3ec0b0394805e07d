use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::max;

/// Credits a jurisdiction can apply against tax before credits.
///
/// Federal credits are not modeled yet; new variants slot in here without
/// changing the shape of [`TaxResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditName {
    PersonalExemption,
    Renters,
}

impl fmt::Display for CreditName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            Self::PersonalExemption => "personal exemption credit",
            Self::Renters => "renter's credit",
        })
    }
}

/// Tax for one jurisdiction before and after credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub before_credits: Decimal,
    pub credits: BTreeMap<CreditName, Decimal>,
    pub after_credits: Decimal,
}

impl TaxResult {
    /// Builds a result, subtracting the credit total once and flooring at zero.
    ///
    /// Credits never produce a refund or carry forward.
    pub fn new(
        before_credits: Decimal,
        credits: BTreeMap<CreditName, Decimal>,
    ) -> Self {
        let total: Decimal = credits.values().copied().sum();
        Self {
            before_credits,
            after_credits: max(before_credits - total, Decimal::ZERO),
            credits,
        }
    }

    /// Result for a jurisdiction that applies no credits.
    pub fn without_credits(before_credits: Decimal) -> Self {
        Self::new(before_credits, BTreeMap::new())
    }

    /// Amount of one credit, zero when it was not applied.
    pub fn credit(
        &self,
        name: CreditName,
    ) -> Decimal {
        self.credits.get(&name).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn total_credits(&self) -> Decimal {
        self.credits.values().copied().sum()
    }
}
