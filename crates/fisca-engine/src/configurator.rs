//! # Period Configurator
//!
//! Manages the evolving set of period entries of one obligation instance.
//! A configurator is bound to one definition and one fiscal year and
//! mutates instances of that definition only.
//!
//! Entries that carry a persisted id are never removed by a toggle: the
//! store is the only authority that can delete a record, so a toggle on a
//! persisted entry is refused with [`ToggleOutcome::KeptPersisted`] and a
//! warning.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use fisca_catalog::ObligationDefinition;
use fisca_core::{
    AmountInput, DateRange, EntryStatus, ObligationFamily, PeriodKey, Periodicity,
    ValidationError,
};

use crate::error::EngineError;
use crate::instance::{ObligationInstance, PeriodEntry};
use crate::missing::missing;

/// Result of [`PeriodConfigurator::toggle_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// An empty entry was added for the key.
    Added,
    /// An unpersisted entry was removed.
    Removed,
    /// The entry is persisted and was left in place.
    KeptPersisted,
}

/// A single field update on a period entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryField {
    /// Amount paid or declared, as typed by the operator.
    Amount(String),
    /// Amount due. Payments only.
    AmountDue(Option<Decimal>),
    /// Payment or filing status.
    Status(EntryStatus),
    /// Operator comment. Empty text clears it.
    Comment(Option<String>),
    /// Explicit period bounds. Date-range quarterly obligations only;
    /// `None` resets to the calendar quarter.
    DateRange(Option<DateRange>),
    /// Filing deadline. Declarations only.
    DueDate(Option<NaiveDate>),
    /// Filing date. Declarations only.
    FiledDate(Option<NaiveDate>),
}

impl EntryField {
    /// Wire name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Amount(_) => "amountPaid",
            Self::AmountDue(_) => "amountDue",
            Self::Status(_) => "status",
            Self::Comment(_) => "comment",
            Self::DateRange(_) => "dateRange",
            Self::DueDate(_) => "dueDate",
            Self::FiledDate(_) => "filedDate",
        }
    }
}

/// Period editor bound to one definition and fiscal year.
#[derive(Debug, Clone, Copy)]
pub struct PeriodConfigurator<'a> {
    definition: &'a ObligationDefinition,
    family: ObligationFamily,
    fiscal_year: i32,
}

impl<'a> PeriodConfigurator<'a> {
    /// Bind a configurator to a definition of `family` for `fiscal_year`.
    pub fn new(
        definition: &'a ObligationDefinition,
        family: ObligationFamily,
        fiscal_year: i32,
    ) -> Self {
        Self {
            definition,
            family,
            fiscal_year,
        }
    }

    /// The bound definition.
    pub fn definition(&self) -> &'a ObligationDefinition {
        self.definition
    }

    /// The bound fiscal year.
    pub fn fiscal_year(&self) -> i32 {
        self.fiscal_year
    }

    /// Choose the instance's periodicity.
    ///
    /// Switching to a different periodicity discards every entry.
    /// Re-selecting the current one changes nothing.
    pub fn set_periodicity(
        &self,
        instance: &mut ObligationInstance,
        periodicity: Periodicity,
    ) -> Result<(), EngineError> {
        self.check_bound(instance)?;
        if !self.definition.allows(periodicity) {
            return Err(EngineError::InvalidPeriodicity {
                code: self.definition.code.clone(),
                reason: format!("{periodicity} is not allowed"),
            });
        }
        if instance.periodicity() == Some(periodicity) {
            return Ok(());
        }
        let discarded = instance.reset_periodicity(periodicity);
        if discarded > 0 {
            tracing::info!(
                code = %self.definition.code,
                %periodicity,
                discarded,
                "periodicity changed, entries discarded"
            );
        }
        Ok(())
    }

    /// Add an empty entry for `period`, or remove it if present and not
    /// persisted.
    pub fn toggle_entry(
        &self,
        instance: &mut ObligationInstance,
        period: PeriodKey,
    ) -> Result<ToggleOutcome, EngineError> {
        self.check_bound(instance)?;
        self.check_key(instance, period)?;

        match instance.entry(period).map(PeriodEntry::is_persisted) {
            Some(true) => {
                tracing::warn!(
                    code = %self.definition.code,
                    %period,
                    "refusing to remove a persisted entry"
                );
                Ok(ToggleOutcome::KeptPersisted)
            }
            Some(false) => {
                instance.remove_entry(period);
                Ok(ToggleOutcome::Removed)
            }
            None => {
                instance.insert_entry(self.empty_entry(period))?;
                Ok(ToggleOutcome::Added)
            }
        }
    }

    /// Add an empty entry for the first missing period.
    ///
    /// Returns the key added, or `None` when every period is present or no
    /// periodicity is set.
    pub fn add_next(
        &self,
        instance: &mut ObligationInstance,
    ) -> Result<Option<PeriodKey>, EngineError> {
        self.check_bound(instance)?;
        let Some(next) = missing(instance).next else {
            return Ok(None);
        };
        instance.insert_entry(self.empty_entry(next))?;
        Ok(Some(next))
    }

    /// Update one field of the entry for `period`.
    pub fn update_field(
        &self,
        instance: &mut ObligationInstance,
        period: PeriodKey,
        field: EntryField,
    ) -> Result<(), EngineError> {
        self.check_bound(instance)?;
        self.check_field(&field)?;
        if let EntryField::DateRange(Some(range)) = &field {
            self.check_range(period, range)?;
        }
        let default_range = self.default_range(period);

        let code = &self.definition.code;
        let entry = instance
            .entry_mut(period)
            .ok_or_else(|| EngineError::PeriodNotFound {
                code: code.clone(),
                period,
            })?;

        match field {
            EntryField::Amount(raw) => {
                entry.amount_paid = AmountInput::parse(raw);
                if !entry.amount_paid.is_valid() {
                    tracing::debug!(%code, %period, raw = entry.amount_paid.raw(), "amount flagged invalid");
                }
            }
            EntryField::AmountDue(value) => entry.amount_due = value,
            EntryField::Status(status) => entry.status = status,
            EntryField::Comment(comment) => {
                entry.comment = comment.filter(|c| !c.trim().is_empty());
            }
            EntryField::DateRange(range) => entry.date_range = range.or(default_range),
            EntryField::DueDate(date) => entry.due_date = date,
            EntryField::FiledDate(date) => entry.filed_date = date,
        }
        Ok(())
    }

    /// An empty entry for `period` with the defaults of the bound
    /// definition filled in.
    pub fn empty_entry(&self, period: PeriodKey) -> PeriodEntry {
        let mut entry = PeriodEntry::empty(period, self.family);
        entry.date_range = self.default_range(period);
        if self.family == ObligationFamily::Declaration {
            entry.due_date = self.definition.due_date_for(self.fiscal_year);
        }
        entry
    }

    fn default_range(&self, period: PeriodKey) -> Option<DateRange> {
        match period {
            PeriodKey::Quarter(q) if self.definition.uses_date_ranges() => {
                DateRange::quarter_bounds(self.fiscal_year, q)
            }
            _ => None,
        }
    }

    fn check_bound(&self, instance: &ObligationInstance) -> Result<(), EngineError> {
        if instance.definition_code() != self.definition.code || instance.family() != self.family
        {
            return Err(EngineError::DefinitionMismatch {
                expected: format!("{} {}", self.family, self.definition.code),
                found: format!("{} {}", instance.family(), instance.definition_code()),
            });
        }
        Ok(())
    }

    fn check_key(&self, instance: &ObligationInstance, period: PeriodKey) -> Result<(), EngineError> {
        match instance.periodicity() {
            None => Err(EngineError::InvalidPeriodicity {
                code: self.definition.code.clone(),
                reason: "choose a periodicity before adding periods".to_string(),
            }),
            Some(p) if p != period.periodicity() => Err(EngineError::InvalidPeriodicity {
                code: self.definition.code.clone(),
                reason: format!("{period} does not belong to {p} periodicity"),
            }),
            Some(_) => Ok(()),
        }
    }

    fn check_field(&self, field: &EntryField) -> Result<(), ValidationError> {
        let not_applicable = || ValidationError::FieldNotApplicable {
            field: field.name(),
            family: self.family.to_string(),
        };
        match (field, self.family) {
            (EntryField::Status(status), family) if status.family() != family => {
                Err(ValidationError::StatusFamilyMismatch {
                    status: status.to_string(),
                    family: family.to_string(),
                })
            }
            (EntryField::AmountDue(_), ObligationFamily::Declaration)
            | (EntryField::DueDate(_), ObligationFamily::Payment)
            | (EntryField::FiledDate(_), ObligationFamily::Payment) => Err(not_applicable()),
            (EntryField::DateRange(_), _) if !self.definition.uses_date_ranges() => {
                Err(not_applicable())
            }
            _ => Ok(()),
        }
    }

    fn check_range(&self, period: PeriodKey, range: &DateRange) -> Result<(), ValidationError> {
        let PeriodKey::Quarter(quarter) = period else {
            return Ok(());
        };
        if !range.starts_in_quarter(self.fiscal_year, quarter) {
            return Err(ValidationError::DateRangeOutsidePeriod {
                start: range.start(),
                quarter,
                fiscal_year: self.fiscal_year,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fisca_catalog::ObligationCatalog;
    use fisca_core::{DeclarationStatus, PaymentStatus, RecordId};

    fn catalog() -> ObligationCatalog {
        ObligationCatalog::builtin().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_set_periodicity_rejects_disallowed() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Payment, "CNSS").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Payment, 2024);
        let mut inst = ObligationInstance::new(ObligationFamily::Payment, "CNSS");
        let err = cfg
            .set_periodicity(&mut inst, Periodicity::Quarterly)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidPeriodicity { .. }));
        assert_eq!(inst.periodicity(), None);
    }

    #[test]
    fn test_switching_periodicity_discards_entries() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Payment, "TVA").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Payment, 2024);
        let mut inst = ObligationInstance::new(ObligationFamily::Payment, "TVA");
        cfg.set_periodicity(&mut inst, Periodicity::Monthly).unwrap();
        cfg.toggle_entry(&mut inst, PeriodKey::Month(1)).unwrap();
        cfg.toggle_entry(&mut inst, PeriodKey::Month(2)).unwrap();

        cfg.set_periodicity(&mut inst, Periodicity::Monthly).unwrap();
        assert_eq!(inst.len(), 2);

        cfg.set_periodicity(&mut inst, Periodicity::Quarterly).unwrap();
        assert!(inst.is_empty());
        assert_eq!(inst.periodicity(), Some(Periodicity::Quarterly));
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Payment, "TVA").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Payment, 2024);
        let mut inst =
            ObligationInstance::with_periodicity(ObligationFamily::Payment, "TVA", Periodicity::Monthly);

        assert_eq!(
            cfg.toggle_entry(&mut inst, PeriodKey::Month(6)).unwrap(),
            ToggleOutcome::Added
        );
        let entry = inst.entry(PeriodKey::Month(6)).unwrap();
        assert_eq!(entry.amount_paid.value(), Some(Decimal::ZERO));
        assert_eq!(entry.status, EntryStatus::Payment(PaymentStatus::Unpaid));
        assert!(entry.id.is_none());

        assert_eq!(
            cfg.toggle_entry(&mut inst, PeriodKey::Month(6)).unwrap(),
            ToggleOutcome::Removed
        );
        assert!(inst.is_empty());
    }

    #[test]
    fn test_toggle_keeps_persisted_entry() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Payment, "TVA").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Payment, 2024);
        let mut inst = ObligationInstance::with_periodicity(
            ObligationFamily::Payment,
            "TVA",
            Periodicity::Quarterly,
        );
        inst.insert_entry(
            PeriodEntry::empty(PeriodKey::Quarter(1), ObligationFamily::Payment)
                .with_id(RecordId(11)),
        )
        .unwrap();

        assert_eq!(
            cfg.toggle_entry(&mut inst, PeriodKey::Quarter(1)).unwrap(),
            ToggleOutcome::KeptPersisted
        );
        assert!(inst.contains(PeriodKey::Quarter(1)));
    }

    #[test]
    fn test_toggle_requires_matching_periodicity() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Payment, "TVA").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Payment, 2024);
        let mut inst = ObligationInstance::new(ObligationFamily::Payment, "TVA");
        assert!(matches!(
            cfg.toggle_entry(&mut inst, PeriodKey::Month(1)),
            Err(EngineError::InvalidPeriodicity { .. })
        ));
        cfg.set_periodicity(&mut inst, Periodicity::Quarterly).unwrap();
        assert!(matches!(
            cfg.toggle_entry(&mut inst, PeriodKey::Month(1)),
            Err(EngineError::InvalidPeriodicity { .. })
        ));
    }

    #[test]
    fn test_configurator_rejects_foreign_instance() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Payment, "TVA").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Payment, 2024);
        let mut inst = ObligationInstance::new(ObligationFamily::Payment, "CNSS");
        assert!(matches!(
            cfg.set_periodicity(&mut inst, Periodicity::Monthly),
            Err(EngineError::DefinitionMismatch { .. })
        ));
    }

    #[test]
    fn test_update_amount_flags_invalid_text() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Payment, "TVA").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Payment, 2024);
        let mut inst =
            ObligationInstance::with_periodicity(ObligationFamily::Payment, "TVA", Periodicity::Monthly);
        cfg.toggle_entry(&mut inst, PeriodKey::Month(1)).unwrap();

        cfg.update_field(&mut inst, PeriodKey::Month(1), EntryField::Amount("12,5".into()))
            .unwrap();
        let entry = inst.entry(PeriodKey::Month(1)).unwrap();
        assert_eq!(entry.amount_paid.value(), Some(Decimal::new(125, 1)));

        cfg.update_field(&mut inst, PeriodKey::Month(1), EntryField::Amount("-3".into()))
            .unwrap();
        let entry = inst.entry(PeriodKey::Month(1)).unwrap();
        assert!(!entry.amount_paid.is_valid());
        assert_eq!(entry.amount_paid.raw(), "-3");
    }

    #[test]
    fn test_update_missing_period_fails() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Payment, "TVA").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Payment, 2024);
        let mut inst =
            ObligationInstance::with_periodicity(ObligationFamily::Payment, "TVA", Periodicity::Monthly);
        let err = cfg
            .update_field(&mut inst, PeriodKey::Month(9), EntryField::Comment(Some("x".into())))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::PeriodNotFound { period: PeriodKey::Month(9), .. }
        ));
    }

    #[test]
    fn test_update_status_checks_family() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Payment, "TVA").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Payment, 2024);
        let mut inst =
            ObligationInstance::with_periodicity(ObligationFamily::Payment, "TVA", Periodicity::Monthly);
        cfg.toggle_entry(&mut inst, PeriodKey::Month(1)).unwrap();
        let err = cfg
            .update_field(
                &mut inst,
                PeriodKey::Month(1),
                EntryField::Status(DeclarationStatus::Filed.into()),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::StatusFamilyMismatch { .. })
        ));
        assert!(matches!(
            cfg.update_field(&mut inst, PeriodKey::Month(1), EntryField::FiledDate(None)),
            Err(EngineError::Validation(ValidationError::FieldNotApplicable { .. }))
        ));
    }

    #[test]
    fn test_date_range_defaults_and_validation() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Payment, "IS_ACOMPTES").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Payment, 2024);
        let mut inst = ObligationInstance::new(ObligationFamily::Payment, "IS_ACOMPTES");
        cfg.set_periodicity(&mut inst, Periodicity::Quarterly).unwrap();
        cfg.toggle_entry(&mut inst, PeriodKey::Quarter(2)).unwrap();

        let range = inst.entry(PeriodKey::Quarter(2)).unwrap().date_range.unwrap();
        assert_eq!(range.start(), date(2024, 4, 1));
        assert_eq!(range.end(), date(2024, 6, 30));

        let custom = DateRange::new(date(2024, 4, 15), date(2024, 7, 14)).unwrap();
        cfg.update_field(&mut inst, PeriodKey::Quarter(2), EntryField::DateRange(Some(custom)))
            .unwrap();
        assert_eq!(inst.entry(PeriodKey::Quarter(2)).unwrap().date_range, Some(custom));

        let outside = DateRange::new(date(2024, 8, 1), date(2024, 9, 30)).unwrap();
        assert!(matches!(
            cfg.update_field(&mut inst, PeriodKey::Quarter(2), EntryField::DateRange(Some(outside))),
            Err(EngineError::Validation(ValidationError::DateRangeOutsidePeriod { .. }))
        ));

        cfg.update_field(&mut inst, PeriodKey::Quarter(2), EntryField::DateRange(None))
            .unwrap();
        assert_eq!(inst.entry(PeriodKey::Quarter(2)).unwrap().date_range, Some(range));
    }

    #[test]
    fn test_declaration_entry_gets_due_date() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Declaration, "LIASSE_FISCALE").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Declaration, 2023);
        let mut inst = ObligationInstance::new(ObligationFamily::Declaration, "LIASSE_FISCALE");
        cfg.set_periodicity(&mut inst, Periodicity::Annual).unwrap();
        assert_eq!(cfg.add_next(&mut inst).unwrap(), Some(PeriodKey::Annual));
        let entry = inst.entry(PeriodKey::Annual).unwrap();
        assert_eq!(entry.due_date, Some(date(2024, 3, 31)));
        assert_eq!(entry.status, EntryStatus::Declaration(DeclarationStatus::NotFiled));
        assert_eq!(cfg.add_next(&mut inst).unwrap(), None);
    }

    #[test]
    fn test_add_next_fills_gaps_in_order() {
        let cat = catalog();
        let def = cat.lookup(ObligationFamily::Payment, "TVA").unwrap();
        let cfg = PeriodConfigurator::new(def, ObligationFamily::Payment, 2024);
        let mut inst = ObligationInstance::with_periodicity(
            ObligationFamily::Payment,
            "TVA",
            Periodicity::Quarterly,
        );
        cfg.toggle_entry(&mut inst, PeriodKey::Quarter(1)).unwrap();
        cfg.toggle_entry(&mut inst, PeriodKey::Quarter(3)).unwrap();
        assert_eq!(cfg.add_next(&mut inst).unwrap(), Some(PeriodKey::Quarter(2)));
        assert_eq!(cfg.add_next(&mut inst).unwrap(), Some(PeriodKey::Quarter(4)));
        assert_eq!(cfg.add_next(&mut inst).unwrap(), None);
        assert_eq!(inst.len(), 4);
    }
}
