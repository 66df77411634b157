//! # Missing-Period Calculator
//!
//! Computes which periods of an instance's periodicity have no entry yet,
//! in canonical order, and the single next period to offer when the
//! operator adds periods one at a time.

use serde::{Deserialize, Serialize};

use fisca_core::PeriodKey;

use crate::instance::ObligationInstance;

/// Absent periods of an instance.
///
/// Invariant: `count == ordered_missing_keys.len()` and
/// `next == ordered_missing_keys.first()`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingPeriods {
    /// Number of absent periods.
    pub count: usize,
    /// Absent periods in canonical order.
    pub ordered_missing_keys: Vec<PeriodKey>,
    /// First absent period, if any.
    pub next: Option<PeriodKey>,
}

impl MissingPeriods {
    /// Whether every period is present.
    pub fn is_complete(&self) -> bool {
        self.count == 0
    }
}

/// Compute the missing periods of `instance`.
///
/// An instance with no periodicity reports nothing missing.
pub fn missing(instance: &ObligationInstance) -> MissingPeriods {
    let Some(periodicity) = instance.periodicity() else {
        return MissingPeriods::default();
    };
    let ordered_missing_keys: Vec<PeriodKey> = periodicity
        .keys()
        .into_iter()
        .filter(|key| !instance.contains(*key))
        .collect();
    MissingPeriods {
        count: ordered_missing_keys.len(),
        next: ordered_missing_keys.first().copied(),
        ordered_missing_keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::PeriodEntry;
    use fisca_core::{ObligationFamily, Periodicity};

    fn instance(periodicity: Periodicity, keys: &[PeriodKey]) -> ObligationInstance {
        let mut inst =
            ObligationInstance::with_periodicity(ObligationFamily::Payment, "TVA", periodicity);
        for key in keys {
            inst.insert_entry(PeriodEntry::empty(*key, ObligationFamily::Payment))
                .unwrap();
        }
        inst
    }

    #[test]
    fn test_monthly_gaps() {
        let inst = instance(
            Periodicity::Monthly,
            &[PeriodKey::Month(1), PeriodKey::Month(2), PeriodKey::Month(5)],
        );
        let out = missing(&inst);
        assert_eq!(out.count, 9);
        assert_eq!(out.next, Some(PeriodKey::Month(3)));
        assert_eq!(out.ordered_missing_keys[..2], [PeriodKey::Month(3), PeriodKey::Month(4)]);
        assert_eq!(out.ordered_missing_keys.last(), Some(&PeriodKey::Month(12)));
    }

    #[test]
    fn test_quarterly_full_year_is_complete() {
        let inst = instance(Periodicity::Quarterly, &Periodicity::Quarterly.keys());
        let out = missing(&inst);
        assert!(out.is_complete());
        assert_eq!(out.next, None);
        assert!(out.ordered_missing_keys.is_empty());
    }

    #[test]
    fn test_annual() {
        let empty = instance(Periodicity::Annual, &[]);
        assert_eq!(
            missing(&empty),
            MissingPeriods {
                count: 1,
                ordered_missing_keys: vec![PeriodKey::Annual],
                next: Some(PeriodKey::Annual),
            }
        );
        let filled = instance(Periodicity::Annual, &[PeriodKey::Annual]);
        assert!(missing(&filled).is_complete());
    }

    #[test]
    fn test_unset_periodicity_reports_nothing() {
        let inst = ObligationInstance::new(ObligationFamily::Payment, "TVA");
        assert_eq!(missing(&inst), MissingPeriods::default());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::instance::PeriodEntry;
    use fisca_core::{ObligationFamily, Periodicity};
    use proptest::prelude::*;

    proptest! {
        /// Monthly missing keys are months 1..=12, strictly increasing, and
        /// exactly the complement of the present keys.
        #[test]
        fn monthly_missing_is_sorted_complement(present in prop::collection::btree_set(1u8..=12, 0..=12)) {
            let mut inst = ObligationInstance::with_periodicity(
                ObligationFamily::Payment,
                "TVA",
                Periodicity::Monthly,
            );
            for m in &present {
                inst.insert_entry(PeriodEntry::empty(PeriodKey::Month(*m), ObligationFamily::Payment))
                    .unwrap();
            }
            let out = missing(&inst);

            prop_assert_eq!(out.count, 12 - present.len());
            prop_assert_eq!(out.count, out.ordered_missing_keys.len());
            prop_assert_eq!(out.next, out.ordered_missing_keys.first().copied());
            for pair in out.ordered_missing_keys.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for key in &out.ordered_missing_keys {
                let n = key.number().unwrap();
                prop_assert!((1..=12).contains(&n));
                prop_assert!(!present.contains(&n));
            }
        }
    }
}
