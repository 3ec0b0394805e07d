use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Filing status as collected by the personal-information step.
///
/// The set is closed. Lookups that cannot find a value for a status fall back
/// to [`FilingStatus::Single`], and unrecognised status strings parse leniently
/// to `Single` through [`FilingStatus::parse_or_single`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadHousehold,
    QualifyingWidow,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 5] = [
        Self::Single,
        Self::MarriedJoint,
        Self::MarriedSeparate,
        Self::HeadHousehold,
        Self::QualifyingWidow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::MarriedJoint => "married_joint",
            Self::MarriedSeparate => "married_separate",
            Self::HeadHousehold => "head_household",
            Self::QualifyingWidow => "qualifying_widow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "single" => Some(Self::Single),
            "married_joint" => Some(Self::MarriedJoint),
            "married_separate" => Some(Self::MarriedSeparate),
            "head_household" => Some(Self::HeadHousehold),
            "qualifying_widow" => Some(Self::QualifyingWidow),
            _ => None,
        }
    }

    /// Parses a status string, treating anything unrecognised as `Single`.
    pub fn parse_or_single(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            debug!(status = s, "unknown filing status, using single");
            Self::Single
        })
    }

    /// The status whose bracket schedule applies to this status.
    ///
    /// Qualifying widow(er)s are taxed on the married-filing-jointly schedule
    /// and never carry a schedule of their own.
    pub fn schedule_status(&self) -> Self {
        match self {
            Self::QualifyingWidow => Self::MarriedJoint,
            other => *other,
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serde helper for interview data: missing, null or unknown statuses
/// deserialize as `Single` instead of failing.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<FilingStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.as_deref()
        .map(FilingStatus::parse_or_single)
        .unwrap_or_default())
}
