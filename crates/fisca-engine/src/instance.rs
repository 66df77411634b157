//! # Obligation Instances and Period Entries
//!
//! An [`ObligationInstance`] is the live, editable aggregate for one
//! obligation within one fiscal-year history: its chosen periodicity and one
//! [`PeriodEntry`] per recorded period.
//!
//! ## Invariants
//!
//! - Every entry's key has the instance's periodicity. An instance with no
//!   periodicity has no entries.
//! - Keys are unique within the instance.
//! - Every entry's status belongs to the instance's family.
//! - Entries are kept in canonical key order.
//!
//! The invariants hold through every mutation path and through
//! deserialization.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fisca_core::{
    AmountInput, DateRange, EntryStatus, ObligationFamily, PeriodKey, Periodicity, RecordId,
    ValidationError,
};

use crate::error::EngineError;

/// One recorded period of an obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodEntry {
    /// Persisted identity; `None` until the store has created the record.
    #[serde(default)]
    pub id: Option<RecordId>,
    /// Period the entry covers.
    pub period: PeriodKey,
    /// Amount paid (payments) or declared (declarations), as typed.
    #[serde(default)]
    pub amount_paid: AmountInput,
    /// Amount due, when known. Payments only.
    #[serde(default)]
    pub amount_due: Option<Decimal>,
    /// Payment or filing status.
    pub status: EntryStatus,
    /// Explicit period bounds, for date-range quarterly obligations.
    #[serde(default)]
    pub date_range: Option<DateRange>,
    /// Filing deadline. Declarations only.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Date the filing was made. Declarations only.
    #[serde(default)]
    pub filed_date: Option<NaiveDate>,
    /// Free-text operator comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl PeriodEntry {
    /// An empty, unpersisted entry: amount zero, initial status of `family`.
    pub fn empty(period: PeriodKey, family: ObligationFamily) -> Self {
        Self {
            id: None,
            period,
            amount_paid: AmountInput::zero(),
            amount_due: None,
            status: family.initial_status(),
            date_range: None,
            due_date: None,
            filed_date: None,
            comment: None,
        }
    }

    /// Builder: set the persisted id.
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Builder: set the amount from operator text.
    pub fn with_amount(mut self, raw: impl Into<String>) -> Self {
        self.amount_paid = AmountInput::parse(raw);
        self
    }

    /// Builder: set the status.
    pub fn with_status(mut self, status: impl Into<EntryStatus>) -> Self {
        self.status = status.into();
        self
    }

    /// Builder: set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Whether the entry corresponds to a persisted record.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// The editable aggregate for one obligation in one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawInstance")]
pub struct ObligationInstance {
    family: ObligationFamily,
    definition_code: String,
    periodicity: Option<Periodicity>,
    entries: Vec<PeriodEntry>,
}

impl ObligationInstance {
    /// A fresh instance with no periodicity and no entries.
    pub fn new(family: ObligationFamily, definition_code: impl Into<String>) -> Self {
        Self {
            family,
            definition_code: definition_code.into(),
            periodicity: None,
            entries: Vec::new(),
        }
    }

    /// A fresh instance with a periodicity already chosen.
    ///
    /// The periodicity is not checked against any definition here; the
    /// configurator and the reconciler do that.
    pub fn with_periodicity(
        family: ObligationFamily,
        definition_code: impl Into<String>,
        periodicity: Periodicity,
    ) -> Self {
        Self {
            periodicity: Some(periodicity),
            ..Self::new(family, definition_code)
        }
    }

    /// Family of the obligation.
    pub fn family(&self) -> ObligationFamily {
        self.family
    }

    /// Code of the obligation definition.
    pub fn definition_code(&self) -> &str {
        &self.definition_code
    }

    /// Chosen periodicity, if any.
    pub fn periodicity(&self) -> Option<Periodicity> {
        self.periodicity
    }

    /// Entries in canonical key order.
    pub fn entries(&self) -> &[PeriodEntry] {
        &self.entries
    }

    /// The entry for `period`, if present.
    pub fn entry(&self, period: PeriodKey) -> Option<&PeriodEntry> {
        self.position(period).ok().map(|i| &self.entries[i])
    }

    /// Whether an entry exists for `period`.
    pub fn contains(&self, period: PeriodKey) -> bool {
        self.position(period).is_ok()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the instance has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose amount text does not parse.
    pub fn invalid_entries(&self) -> impl Iterator<Item = &PeriodEntry> {
        self.entries.iter().filter(|e| !e.amount_paid.is_valid())
    }

    /// Insert an entry, keeping canonical order.
    ///
    /// Fails when no periodicity is set, when the key's periodicity differs
    /// from the instance's, when the entry's status belongs to the other
    /// family, or when the key is already present.
    pub fn insert_entry(&mut self, entry: PeriodEntry) -> Result<(), EngineError> {
        let Some(periodicity) = self.periodicity else {
            return Err(EngineError::InvalidPeriodicity {
                code: self.definition_code.clone(),
                reason: "no periodicity has been chosen".to_string(),
            });
        };
        if entry.period.periodicity() != periodicity {
            return Err(EngineError::InvalidPeriodicity {
                code: self.definition_code.clone(),
                reason: format!(
                    "{} does not belong to {periodicity} periodicity",
                    entry.period
                ),
            });
        }
        if entry.status.family() != self.family {
            return Err(ValidationError::StatusFamilyMismatch {
                status: entry.status.to_string(),
                family: self.family.to_string(),
            }
            .into());
        }
        match self.position(entry.period) {
            Ok(_) => Err(EngineError::DuplicatePeriod {
                code: self.definition_code.clone(),
                period: entry.period,
            }),
            Err(at) => {
                self.entries.insert(at, entry);
                Ok(())
            }
        }
    }

    pub(crate) fn entry_mut(&mut self, period: PeriodKey) -> Option<&mut PeriodEntry> {
        match self.position(period) {
            Ok(i) => self.entries.get_mut(i),
            Err(_) => None,
        }
    }

    pub(crate) fn remove_entry(&mut self, period: PeriodKey) -> Option<PeriodEntry> {
        self.position(period).ok().map(|i| self.entries.remove(i))
    }

    pub(crate) fn reset_periodicity(&mut self, periodicity: Periodicity) -> usize {
        let discarded = self.entries.len();
        self.entries.clear();
        self.periodicity = Some(periodicity);
        discarded
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [PeriodEntry] {
        &mut self.entries
    }

    fn position(&self, period: PeriodKey) -> Result<usize, usize> {
        self.entries.binary_search_by(|e| e.period.cmp(&period))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInstance {
    family: ObligationFamily,
    definition_code: String,
    #[serde(default)]
    periodicity: Option<Periodicity>,
    #[serde(default)]
    entries: Vec<PeriodEntry>,
}

impl TryFrom<RawInstance> for ObligationInstance {
    type Error = EngineError;

    fn try_from(raw: RawInstance) -> Result<Self, Self::Error> {
        let mut instance = ObligationInstance {
            family: raw.family,
            definition_code: raw.definition_code,
            periodicity: raw.periodicity,
            entries: Vec::with_capacity(raw.entries.len()),
        };
        for entry in raw.entries {
            instance.insert_entry(entry)?;
        }
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fisca_core::{DeclarationStatus, PaymentStatus};

    fn monthly() -> ObligationInstance {
        ObligationInstance::with_periodicity(ObligationFamily::Payment, "TVA", Periodicity::Monthly)
    }

    #[test]
    fn test_insert_keeps_canonical_order() {
        let mut inst = monthly();
        for m in [7, 2, 11, 1] {
            inst.insert_entry(PeriodEntry::empty(PeriodKey::Month(m), ObligationFamily::Payment))
                .unwrap();
        }
        let keys: Vec<PeriodKey> = inst.entries().iter().map(|e| e.period).collect();
        assert_eq!(
            keys,
            vec![
                PeriodKey::Month(1),
                PeriodKey::Month(2),
                PeriodKey::Month(7),
                PeriodKey::Month(11)
            ]
        );
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut inst = monthly();
        let entry = PeriodEntry::empty(PeriodKey::Month(3), ObligationFamily::Payment);
        inst.insert_entry(entry.clone()).unwrap();
        let err = inst.insert_entry(entry).unwrap_err();
        assert!(matches!(err, EngineError::DuplicatePeriod { .. }));
        assert_eq!(inst.len(), 1);
    }

    #[test]
    fn test_insert_rejects_wrong_periodicity() {
        let mut inst = monthly();
        let err = inst
            .insert_entry(PeriodEntry::empty(PeriodKey::Quarter(1), ObligationFamily::Payment))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidPeriodicity { .. }));
    }

    #[test]
    fn test_insert_rejects_status_of_other_family() {
        let mut inst = monthly();
        let err = inst
            .insert_entry(
                PeriodEntry::empty(PeriodKey::Month(1), ObligationFamily::Payment)
                    .with_status(DeclarationStatus::Filed),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::StatusFamilyMismatch { .. })
        ));
        assert!(inst.is_empty());
    }

    #[test]
    fn test_insert_requires_periodicity() {
        let mut inst = ObligationInstance::new(ObligationFamily::Payment, "TVA");
        let err = inst
            .insert_entry(PeriodEntry::empty(PeriodKey::Annual, ObligationFamily::Payment))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidPeriodicity { .. }));
    }

    #[test]
    fn test_lookup_and_invalid_entries() {
        let mut inst = monthly();
        inst.insert_entry(
            PeriodEntry::empty(PeriodKey::Month(4), ObligationFamily::Payment)
                .with_amount("abc")
                .with_status(PaymentStatus::Partial),
        )
        .unwrap();
        assert!(inst.contains(PeriodKey::Month(4)));
        assert!(inst.entry(PeriodKey::Month(5)).is_none());
        assert_eq!(inst.invalid_entries().count(), 1);
    }

    #[test]
    fn test_deserialize_enforces_invariants() {
        let ok = r#"{
            "family": "PAYMENT",
            "definitionCode": "TVA",
            "periodicity": "QUARTERLY",
            "entries": [
                {"period": {"periodicity": "QUARTERLY", "number": 2},
                 "amountPaid": "500",
                 "status": {"family": "PAYMENT", "status": "UNPAID"}},
                {"id": 7,
                 "period": {"periodicity": "QUARTERLY", "number": 1},
                 "amountPaid": "1000",
                 "status": {"family": "PAYMENT", "status": "PAID"}}
            ]
        }"#;
        let inst: ObligationInstance = serde_json::from_str(ok).unwrap();
        assert_eq!(inst.entries()[0].period, PeriodKey::Quarter(1));
        assert_eq!(inst.entries()[0].id, Some(RecordId(7)));

        let dup = r#"{
            "family": "PAYMENT",
            "definitionCode": "TVA",
            "periodicity": "ANNUAL",
            "entries": [
                {"period": {"periodicity": "ANNUAL"}, "status": {"family": "PAYMENT", "status": "UNPAID"}},
                {"period": {"periodicity": "ANNUAL"}, "status": {"family": "PAYMENT", "status": "PAID"}}
            ]
        }"#;
        assert!(serde_json::from_str::<ObligationInstance>(dup).is_err());

        let mixed = r#"{
            "family": "PAYMENT",
            "definitionCode": "TVA",
            "periodicity": "ANNUAL",
            "entries": [
                {"period": {"periodicity": "ANNUAL"}, "status": {"family": "DECLARATION", "status": "FILED"}}
            ]
        }"#;
        assert!(serde_json::from_str::<ObligationInstance>(mixed).is_err());
    }
}
