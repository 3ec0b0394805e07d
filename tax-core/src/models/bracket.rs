use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::FilingStatus;

/// Upper edge of a bracket or an income limit.
///
/// Serialized as a plain number, with `null` standing for an unbounded edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Decimal>", into = "Option<Decimal>")]
pub enum UpperBound {
    Bounded(Decimal),
    Unbounded,
}

impl UpperBound {
    /// Whether `amount` is at or below this bound.
    pub fn admits(
        &self,
        amount: Decimal,
    ) -> bool {
        match self {
            Self::Bounded(limit) => amount <= *limit,
            Self::Unbounded => true,
        }
    }

    pub fn as_option(&self) -> Option<Decimal> {
        match self {
            Self::Bounded(limit) => Some(*limit),
            Self::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl From<Option<Decimal>> for UpperBound {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Self::Unbounded, Self::Bounded)
    }
}

impl From<UpperBound> for Option<Decimal> {
    fn from(value: UpperBound) -> Self {
        value.as_option()
    }
}

/// One marginal bracket: income up to `up_to` is taxed at `rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub up_to: UpperBound,
    pub rate: Decimal,
}

impl Bracket {
    pub fn bounded(
        up_to: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            up_to: UpperBound::Bounded(up_to),
            rate,
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        Self {
            up_to: UpperBound::Unbounded,
            rate,
        }
    }
}

/// Errors found while checking a bracket list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("bracket list is empty")]
    Empty,

    #[error("bracket {index} upper bound {bound} does not exceed the previous bound")]
    BoundsNotIncreasing { index: usize, bound: Decimal },

    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedBeforeLast { index: usize },

    #[error("last bracket must be unbounded")]
    LastBracketBounded,

    #[error("bracket {index} rate {rate} is outside [0, 1]")]
    RateOutOfRange { index: usize, rate: Decimal },
}

/// Checks the structural invariants of an ordered bracket list.
///
/// Bounds must be strictly increasing from zero and only the final bracket may
/// be unbounded. A rate that drops below its predecessor is logged but allowed.
pub fn validate_brackets(brackets: &[Bracket]) -> Result<(), ScheduleError> {
    if brackets.is_empty() {
        return Err(ScheduleError::Empty);
    }

    let last = brackets.len() - 1;
    let mut previous = Decimal::ZERO;
    let mut previous_rate = Decimal::ZERO;

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(ScheduleError::RateOutOfRange {
                index,
                rate: bracket.rate,
            });
        }
        if bracket.rate < previous_rate {
            warn!(index, rate = %bracket.rate, previous = %previous_rate, "bracket rate decreases");
        }
        previous_rate = bracket.rate;

        match bracket.up_to {
            UpperBound::Bounded(bound) => {
                if bound <= previous {
                    return Err(ScheduleError::BoundsNotIncreasing { index, bound });
                }
                previous = bound;
            }
            UpperBound::Unbounded if index != last => {
                return Err(ScheduleError::UnboundedBeforeLast { index });
            }
            UpperBound::Unbounded => {}
        }
    }

    if !brackets[last].up_to.is_unbounded() {
        return Err(ScheduleError::LastBracketBounded);
    }

    Ok(())
}

/// Bracket lists keyed by filing status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BracketSchedule(BTreeMap<FilingStatus, Vec<Bracket>>);

impl BracketSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(
        mut self,
        status: FilingStatus,
        brackets: Vec<Bracket>,
    ) -> Self {
        self.insert(status, brackets);
        self
    }

    pub fn insert(
        &mut self,
        status: FilingStatus,
        brackets: Vec<Bracket>,
    ) {
        self.0.insert(status, brackets);
    }

    /// Brackets stored under exactly `status`, with no aliasing or fallback.
    pub fn get(
        &self,
        status: FilingStatus,
    ) -> Option<&[Bracket]> {
        self.0.get(&status).map(Vec::as_slice)
    }

    /// Brackets that apply to `status`.
    ///
    /// Qualifying widow(er) resolves to married-filing-jointly. A status with
    /// no schedule uses the single schedule, and a table without one yields no
    /// brackets at all (zero tax) rather than failing.
    pub fn for_status(
        &self,
        status: FilingStatus,
    ) -> &[Bracket] {
        let resolved = status.schedule_status();
        if let Some(brackets) = self.get(resolved) {
            return brackets;
        }
        debug!(status = %resolved, "no bracket schedule for status, using single");
        self.get(FilingStatus::Single).unwrap_or(&[])
    }

    pub fn statuses(&self) -> impl Iterator<Item = FilingStatus> + '_ {
        self.0.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validates every bracket list, reporting the first failing status.
    pub fn validate(&self) -> Result<(), (FilingStatus, ScheduleError)> {
        for (status, brackets) in &self.0 {
            validate_brackets(brackets).map_err(|e| (*status, e))?;
        }
        Ok(())
    }
}

impl FromIterator<(FilingStatus, Vec<Bracket>)> for BracketSchedule {
    fn from_iter<T: IntoIterator<Item = (FilingStatus, Vec<Bracket>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
