//! # Periodicities and Period Keys
//!
//! An obligation is tracked monthly, quarterly, or annually. Within one
//! fiscal year, each sub-period is identified by a [`PeriodKey`]:
//!
//! ```text
//! MONTHLY   → Month(1) … Month(12)
//! QUARTERLY → Quarter(1) … Quarter(4)
//! ANNUAL    → Annual (singleton)
//! ```
//!
//! Keys derive `Ord`, and the derived order is the canonical order used by
//! the missing-period calculator: months ascending, quarters ascending.
//! Keys of different periodicities never coexist in one instance, so the
//! cross-variant part of the ordering is irrelevant.

use serde::{Deserialize, Serialize};

use crate::error::FiscaError;

/// Time granularity at which an obligation's entries are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Periodicity {
    /// Twelve entries per fiscal year.
    Monthly,
    /// Four entries per fiscal year.
    Quarterly,
    /// One entry per fiscal year.
    Annual,
}

impl Periodicity {
    /// All periodicities, in declaration order.
    pub const ALL: [Periodicity; 3] = [Self::Monthly, Self::Quarterly, Self::Annual];

    /// Return the wire representation of this periodicity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "MONTHLY",
            Self::Quarterly => "QUARTERLY",
            Self::Annual => "ANNUAL",
        }
    }

    /// Number of period slots in one fiscal year.
    pub fn slot_count(&self) -> u8 {
        match self {
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Annual => 1,
        }
    }

    /// Every valid key for this periodicity, in canonical order.
    pub fn keys(&self) -> Vec<PeriodKey> {
        match self {
            Self::Monthly => (1..=12).map(PeriodKey::Month).collect(),
            Self::Quarterly => (1..=4).map(PeriodKey::Quarter).collect(),
            Self::Annual => vec![PeriodKey::Annual],
        }
    }
}

impl std::fmt::Display for Periodicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of one sub-period within a fiscal year.
///
/// Construct through [`PeriodKey::new`], [`PeriodKey::month`] or
/// [`PeriodKey::quarter`]; deserialization goes through the same checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriodKey", into = "RawPeriodKey")]
pub enum PeriodKey {
    /// Month number, 1–12.
    Month(u8),
    /// Quarter number, 1–4.
    Quarter(u8),
    /// The single annual slot.
    Annual,
}

impl PeriodKey {
    /// Build a key from a periodicity and an optional period number.
    ///
    /// MONTHLY and QUARTERLY require a number in range; ANNUAL requires none.
    pub fn new(periodicity: Periodicity, number: Option<u8>) -> Result<Self, FiscaError> {
        match (periodicity, number) {
            (Periodicity::Monthly, Some(n)) => Self::month(n),
            (Periodicity::Quarterly, Some(n)) => Self::quarter(n),
            (Periodicity::Annual, None) => Ok(Self::Annual),
            _ => Err(FiscaError::PeriodShapeMismatch {
                periodicity,
                number,
            }),
        }
    }

    /// Build a monthly key.
    pub fn month(number: u8) -> Result<Self, FiscaError> {
        check_range(Periodicity::Monthly, number)?;
        Ok(Self::Month(number))
    }

    /// Build a quarterly key.
    pub fn quarter(number: u8) -> Result<Self, FiscaError> {
        check_range(Periodicity::Quarterly, number)?;
        Ok(Self::Quarter(number))
    }

    /// The periodicity this key belongs to.
    pub fn periodicity(&self) -> Periodicity {
        match self {
            Self::Month(_) => Periodicity::Monthly,
            Self::Quarter(_) => Periodicity::Quarterly,
            Self::Annual => Periodicity::Annual,
        }
    }

    /// The period number, or `None` for the annual slot.
    pub fn number(&self) -> Option<u8> {
        match self {
            Self::Month(n) | Self::Quarter(n) => Some(*n),
            Self::Annual => None,
        }
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Month(n) => write!(f, "month {n}"),
            Self::Quarter(n) => write!(f, "quarter {n}"),
            Self::Annual => f.write_str("annual"),
        }
    }
}

fn check_range(periodicity: Periodicity, number: u8) -> Result<(), FiscaError> {
    let max = periodicity.slot_count();
    if number == 0 || number > max {
        return Err(FiscaError::PeriodOutOfRange {
            periodicity,
            number,
            max,
        });
    }
    Ok(())
}

/// Serialized shape of a [`PeriodKey`].
#[derive(Serialize, Deserialize)]
struct RawPeriodKey {
    periodicity: Periodicity,
    #[serde(default)]
    number: Option<u8>,
}

impl TryFrom<RawPeriodKey> for PeriodKey {
    type Error = FiscaError;

    fn try_from(raw: RawPeriodKey) -> Result<Self, Self::Error> {
        PeriodKey::new(raw.periodicity, raw.number)
    }
}

impl From<PeriodKey> for RawPeriodKey {
    fn from(key: PeriodKey) -> Self {
        RawPeriodKey {
            periodicity: key.periodicity(),
            number: key.number(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_key() -> impl Strategy<Value = PeriodKey> {
        prop_oneof![
            (1u8..=12).prop_map(PeriodKey::Month),
            (1u8..=4).prop_map(PeriodKey::Quarter),
            Just(PeriodKey::Annual),
        ]
    }

    proptest! {
        /// Every valid key survives its serialized shape unchanged.
        #[test]
        fn serde_round_trip(key in any_key()) {
            let json = serde_json::to_string(&key).unwrap();
            let back: PeriodKey = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, key);
        }

        /// A number is accepted exactly when it names a slot of the periodicity.
        #[test]
        fn new_accepts_only_slots_in_range(
            periodicity in prop::sample::select(Periodicity::ALL.to_vec()),
            number in any::<u8>(),
        ) {
            let built = PeriodKey::new(periodicity, Some(number));
            let in_range = periodicity != Periodicity::Annual
                && (1..=periodicity.slot_count()).contains(&number);
            prop_assert_eq!(built.is_ok(), in_range);
            if let Ok(key) = built {
                prop_assert_eq!(key.periodicity(), periodicity);
                prop_assert_eq!(key.number(), Some(number));
            }
        }
    }
}
