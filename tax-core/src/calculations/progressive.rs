//! Marginal-bracket tax accumulation.
//!
//! Income is walked through the brackets in ascending order. Each bracket
//! taxes the slice of income between the previous upper bound and its own:
//!
//! ```text
//! amount = max(0, min(remaining, up_to - previous_up_to))
//! tax   += amount * rate
//! ```
//!
//! The walk stops as soon as no income remains. A [`Surtax`] may add a flat
//! rate on income above a threshold before the total is rounded to whole
//! dollars.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::Bracket;
//! use tax_core::calculations::ProgressiveTax;
//!
//! let brackets = vec![
//!     Bracket::bounded(dec!(11600), dec!(0.10)),
//!     Bracket::bounded(dec!(47150), dec!(0.12)),
//!     Bracket::unbounded(dec!(0.22)),
//! ];
//!
//! let tax = ProgressiveTax::new(&brackets).tax_before_credits(dec!(20000));
//!
//! // 11600 * 0.10 + 8400 * 0.12
//! assert_eq!(tax, dec!(2168));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::common::{max, round_whole_dollars};
use crate::models::{Bracket, UpperBound};

/// Flat additional rate on taxable income above a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surtax {
    pub threshold: Decimal,
    pub rate: Decimal,
}

impl Surtax {
    /// California Mental Health Services Tax: 1% above $1,000,000.
    pub const MENTAL_HEALTH_SERVICES: Surtax = Surtax {
        threshold: dec!(1000000),
        rate: dec!(0.01),
    };

    pub fn amount(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income > self.threshold {
            (taxable_income - self.threshold) * self.rate
        } else {
            Decimal::ZERO
        }
    }
}

/// Calculator over one filing status's bracket list.
#[derive(Debug, Clone, Copy)]
pub struct ProgressiveTax<'a> {
    brackets: &'a [Bracket],
    surtax: Option<Surtax>,
}

impl<'a> ProgressiveTax<'a> {
    /// Brackets must be ascending with an unbounded final bracket. Income past
    /// a bounded final bracket goes untaxed.
    pub fn new(brackets: &'a [Bracket]) -> Self {
        Self {
            brackets,
            surtax: None,
        }
    }

    pub fn with_surtax(
        mut self,
        surtax: Surtax,
    ) -> Self {
        self.surtax = Some(surtax);
        self
    }

    /// Unrounded sum of `amount * rate` over the brackets.
    ///
    /// Callers clamp taxable income to zero beforehand; a non-positive income
    /// yields zero.
    pub fn bracket_sum(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        let mut remaining = taxable_income;
        let mut previous = Decimal::ZERO;
        let mut tax = Decimal::ZERO;

        for bracket in self.brackets {
            if remaining <= Decimal::ZERO {
                break;
            }
            let amount = match bracket.up_to {
                UpperBound::Bounded(up_to) => {
                    let width = up_to - previous;
                    previous = up_to;
                    max(Decimal::ZERO, remaining.min(width))
                }
                UpperBound::Unbounded => remaining,
            };
            tax += amount * bracket.rate;
            remaining -= amount;
        }

        tax
    }

    /// Bracket sum plus surtax, rounded to whole dollars.
    pub fn tax_before_credits(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        let surtax = self
            .surtax
            .map_or(Decimal::ZERO, |s| s.amount(taxable_income));
        round_whole_dollars(self.bracket_sum(taxable_income) + surtax)
    }
}
