//! Compiled-in 2024 baseline tables.
//!
//! Figures are illustrative approximations of the IRS and FTB 2024 schedules.
//! Other years inherit these until an override document supplies their own.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{
    Bracket, BracketSchedule, FilingStatus, RentersCredit, StatusAmounts, UpperBound, YearTable,
};

pub const BASELINE_YEAR: i32 = 2024;
pub const FEDERAL_FIRST_YEAR: i32 = 2020;
pub const FEDERAL_LAST_YEAR: i32 = 2025;
pub const CALIFORNIA_FIRST_YEAR: i32 = 2020;
pub const CALIFORNIA_LAST_YEAR: i32 = 2024;

fn brackets(
    bounded: &[(Decimal, Decimal)],
    top_rate: Decimal,
) -> Vec<Bracket> {
    bounded
        .iter()
        .map(|&(up_to, rate)| Bracket::bounded(up_to, rate))
        .chain(std::iter::once(Bracket::unbounded(top_rate)))
        .collect()
}

fn by_status<T: Copy>(values: [(FilingStatus, T); 5]) -> StatusAmounts<T> {
    values.into_iter().collect()
}

/// Amounts in the order single, married separate, married joint, head of
/// household, qualifying widow(er).
fn amounts(
    single: Decimal,
    married_separate: Decimal,
    married_joint: Decimal,
    head_household: Decimal,
    qualifying_widow: Decimal,
) -> StatusAmounts {
    by_status([
        (FilingStatus::Single, single),
        (FilingStatus::MarriedSeparate, married_separate),
        (FilingStatus::MarriedJoint, married_joint),
        (FilingStatus::HeadHousehold, head_household),
        (FilingStatus::QualifyingWidow, qualifying_widow),
    ])
}

/// Federal 2024 (IRS IR-2023-208). Qualifying widow(er) uses married-joint.
pub fn federal_2024() -> YearTable {
    let joint = brackets(
        &[
            (dec!(23200), dec!(0.10)),
            (dec!(94300), dec!(0.12)),
            (dec!(201050), dec!(0.22)),
            (dec!(383900), dec!(0.24)),
            (dec!(487450), dec!(0.32)),
            (dec!(731200), dec!(0.35)),
        ],
        dec!(0.37),
    );

    YearTable {
        brackets: BracketSchedule::new()
            .with_status(
                FilingStatus::Single,
                brackets(
                    &[
                        (dec!(11600), dec!(0.10)),
                        (dec!(47150), dec!(0.12)),
                        (dec!(100525), dec!(0.22)),
                        (dec!(191950), dec!(0.24)),
                        (dec!(243725), dec!(0.32)),
                        (dec!(609350), dec!(0.35)),
                    ],
                    dec!(0.37),
                ),
            )
            .with_status(FilingStatus::MarriedJoint, joint)
            .with_status(
                FilingStatus::MarriedSeparate,
                brackets(
                    &[
                        (dec!(11600), dec!(0.10)),
                        (dec!(47150), dec!(0.12)),
                        (dec!(100525), dec!(0.22)),
                        (dec!(191950), dec!(0.24)),
                        (dec!(243725), dec!(0.32)),
                        (dec!(365600), dec!(0.35)),
                    ],
                    dec!(0.37),
                ),
            )
            .with_status(
                FilingStatus::HeadHousehold,
                brackets(
                    &[
                        (dec!(16550), dec!(0.10)),
                        (dec!(63100), dec!(0.12)),
                        (dec!(100500), dec!(0.22)),
                        (dec!(191950), dec!(0.24)),
                        (dec!(243700), dec!(0.32)),
                        (dec!(609350), dec!(0.35)),
                    ],
                    dec!(0.37),
                ),
            ),
        standard_deduction: amounts(
            dec!(14600),
            dec!(14600),
            dec!(29200),
            dec!(21900),
            dec!(29200),
        ),
        personal_exemption_credit: None,
        renters_credit: None,
    }
}

/// California 2024. Married-filing-separately has no schedule of its own and
/// falls back to single; qualifying widow(er) uses married-joint.
pub fn california_2024() -> YearTable {
    YearTable {
        brackets: BracketSchedule::new()
            .with_status(
                FilingStatus::Single,
                brackets(
                    &[
                        (dec!(10412), dec!(0.01)),
                        (dec!(24684), dec!(0.02)),
                        (dec!(38959), dec!(0.04)),
                        (dec!(54081), dec!(0.06)),
                        (dec!(68350), dec!(0.08)),
                        (dec!(349137), dec!(0.093)),
                        (dec!(418961), dec!(0.1023)),
                        (dec!(698271), dec!(0.113)),
                    ],
                    dec!(0.123),
                ),
            )
            .with_status(
                FilingStatus::MarriedJoint,
                brackets(
                    &[
                        (dec!(20824), dec!(0.01)),
                        (dec!(49368), dec!(0.02)),
                        (dec!(77918), dec!(0.04)),
                        (dec!(108162), dec!(0.06)),
                        (dec!(136700), dec!(0.08)),
                        (dec!(698274), dec!(0.093)),
                        (dec!(837922), dec!(0.1023)),
                        (dec!(1396542), dec!(0.113)),
                    ],
                    dec!(0.123),
                ),
            )
            .with_status(
                FilingStatus::HeadHousehold,
                brackets(
                    &[
                        (dec!(20824), dec!(0.01)),
                        (dec!(32815), dec!(0.02)),
                        (dec!(42792), dec!(0.04)),
                        (dec!(54081), dec!(0.06)),
                        (dec!(68350), dec!(0.08)),
                        (dec!(349137), dec!(0.093)),
                        (dec!(418961), dec!(0.1023)),
                        (dec!(698271), dec!(0.113)),
                    ],
                    dec!(0.123),
                ),
            ),
        standard_deduction: amounts(
            dec!(5363),
            dec!(5363),
            dec!(10726),
            dec!(10726),
            dec!(10726),
        ),
        personal_exemption_credit: Some(amounts(
            dec!(146),
            dec!(146),
            dec!(292),
            dec!(292),
            dec!(292),
        )),
        // Assumes residency and at least six months of rent paid.
        renters_credit: Some(RentersCredit {
            amount: amounts(dec!(60), dec!(60), dec!(120), dec!(120), dec!(120)),
            income_limit: by_status(FilingStatus::ALL.map(|s| (s, UpperBound::Unbounded))),
        }),
    }
}
