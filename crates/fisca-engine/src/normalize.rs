//! # Record Normalizer
//!
//! Flattens configured obligation instances into canonical records: one
//! [`PaymentRecord`] or [`DeclarationRecord`] per period entry. An instance
//! without entries contributes nothing.
//!
//! Entries whose amount text does not parse are never emitted. They are
//! listed in [`NormalizedRecords::excluded`] so the caller can decide
//! whether to refuse the submission (the reconciler does) or report them.

use serde::Serialize;

use fisca_catalog::{eligibility, ObligationCatalog, ObligationDefinition};
use fisca_core::{
    ClientProfile, DateRange, EntryStatus, ObligationFamily, PeriodKey, ValidationError,
};

use crate::error::EngineError;
use crate::instance::{ObligationInstance, PeriodEntry};
use crate::record::{DeclarationRecord, PaymentRecord};

/// An entry left out of normalization because its amount is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedEntry {
    /// Family of the obligation.
    pub family: ObligationFamily,
    /// Obligation code.
    pub code: String,
    /// Period of the entry.
    pub period: PeriodKey,
    /// The amount text as typed.
    pub raw: String,
}

impl ExcludedEntry {
    /// The validation error describing this exclusion.
    pub fn to_error(&self) -> ValidationError {
        ValidationError::InvalidAmount {
            code: self.code.clone(),
            period: self.period.to_string(),
            raw: self.raw.clone(),
        }
    }
}

/// Output of normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecords {
    /// Payment records, in instance then period order.
    pub payments: Vec<PaymentRecord>,
    /// Declaration records, in instance order.
    pub declarations: Vec<DeclarationRecord>,
    /// Entries left out because their amount is invalid.
    pub excluded: Vec<ExcludedEntry>,
}

impl NormalizedRecords {
    /// Total number of emitted records.
    pub fn record_count(&self) -> usize {
        self.payments.len() + self.declarations.len()
    }

    /// Whether every entry was emitted.
    pub fn is_clean(&self) -> bool {
        self.excluded.is_empty()
    }

    fn extend(&mut self, other: NormalizedRecords) {
        self.payments.extend(other.payments);
        self.declarations.extend(other.declarations);
        self.excluded.extend(other.excluded);
    }
}

/// Resolve the definition of an instance's obligation.
pub(crate) fn definition_of<'c>(
    catalog: &'c ObligationCatalog,
    family: ObligationFamily,
    code: &str,
) -> Result<&'c ObligationDefinition, EngineError> {
    catalog
        .get(family, code)
        .ok_or_else(|| EngineError::UnknownObligation {
            family,
            code: code.to_string(),
        })
}

/// Normalize one instance for `fiscal_year`.
pub fn normalize_instance(
    catalog: &ObligationCatalog,
    fiscal_year: i32,
    instance: &ObligationInstance,
) -> Result<NormalizedRecords, EngineError> {
    let definition = definition_of(catalog, instance.family(), instance.definition_code())?;
    let mut out = NormalizedRecords::default();
    let Some(periodicity) = instance.periodicity() else {
        return Ok(out);
    };
    if !instance.is_empty() && !definition.allows(periodicity) {
        return Err(EngineError::InvalidPeriodicity {
            code: definition.code.clone(),
            reason: format!("{periodicity} is not allowed"),
        });
    }

    for entry in instance.entries() {
        let Some(amount) = entry.amount_paid.value() else {
            out.excluded.push(ExcludedEntry {
                family: instance.family(),
                code: definition.code.clone(),
                period: entry.period,
                raw: entry.amount_paid.raw().to_string(),
            });
            continue;
        };
        match (instance.family(), entry.status) {
            (ObligationFamily::Payment, EntryStatus::Payment(status)) => {
                let (period_number, range) = payment_period(definition, fiscal_year, entry)?;
                out.payments.push(PaymentRecord {
                    id: entry.id,
                    obligation_code: definition.code.clone(),
                    type_name: definition.display_name.clone(),
                    periodicity,
                    period_number,
                    date_range_start: range.map(|r| r.start()),
                    date_range_end: range.map(|r| r.end()),
                    amount_due: entry.amount_due,
                    amount_paid: amount,
                    status,
                    comment: entry.comment.clone(),
                });
            }
            (ObligationFamily::Declaration, EntryStatus::Declaration(status)) => {
                out.declarations.push(DeclarationRecord {
                    id: entry.id,
                    obligation_code: definition.code.clone(),
                    type_name: definition.display_name.clone(),
                    fiscal_year,
                    filed_date: entry.filed_date,
                    declared_amount: amount,
                    due_date: entry.due_date,
                    status,
                    mandatory: definition.mandatory,
                    comment: entry.comment.clone(),
                });
            }
            (family, status) => {
                return Err(ValidationError::StatusFamilyMismatch {
                    status: status.to_string(),
                    family: family.to_string(),
                }
                .into());
            }
        }
    }
    Ok(out)
}

/// Normalize a whole selection for `fiscal_year`.
///
/// When a client is given, instances the client is not eligible for are
/// dropped before flattening. Two instances of the same obligation are
/// rejected.
pub fn normalize_selection(
    catalog: &ObligationCatalog,
    fiscal_year: i32,
    client: Option<&ClientProfile>,
    instances: &[ObligationInstance],
) -> Result<NormalizedRecords, EngineError> {
    let mut out = NormalizedRecords::default();
    let mut seen: Vec<(ObligationFamily, &str)> = Vec::new();

    for instance in instances {
        let key = (instance.family(), instance.definition_code());
        if seen.contains(&key) {
            return Err(EngineError::DuplicateInstance {
                family: key.0,
                code: key.1.to_string(),
            });
        }
        seen.push(key);

        let definition = definition_of(catalog, instance.family(), instance.definition_code())?;
        if let Some(client) = client {
            if !eligibility::is_eligible(definition, client) {
                tracing::info!(
                    family = %instance.family(),
                    code = %definition.code,
                    legal_form = %client.legal_form,
                    "dropping obligation the client is not eligible for"
                );
                continue;
            }
        }
        out.extend(normalize_instance(catalog, fiscal_year, instance)?);
    }
    Ok(out)
}

fn payment_period(
    definition: &ObligationDefinition,
    fiscal_year: i32,
    entry: &PeriodEntry,
) -> Result<(Option<u8>, Option<DateRange>), ValidationError> {
    match entry.period {
        PeriodKey::Quarter(q) if definition.uses_date_ranges() => match entry.date_range {
            Some(range) if !range.starts_in_quarter(fiscal_year, q) => {
                Err(ValidationError::DateRangeOutsidePeriod {
                    start: range.start(),
                    quarter: q,
                    fiscal_year,
                })
            }
            Some(range) => Ok((None, Some(range))),
            None => Ok((None, DateRange::quarter_bounds(fiscal_year, q))),
        },
        key => Ok((key.number(), None)),
    }
}
