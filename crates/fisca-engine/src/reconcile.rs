//! # History Reconciler
//!
//! Moves one obligation between its two representations: the editable
//! [`ObligationInstance`] and the flat records of a [`FiscalHistory`].
//!
//! - [`merge`] replaces one obligation's records with the normalized
//!   entries of an edited instance, leaving every other obligation's
//!   records untouched and in their original order.
//! - [`extract`] rebuilds the editable instance from the records.
//! - [`rebase`] repairs an instance after the store rejected a stale id.
//!
//! Merging is idempotent: merging the same instance twice yields the same
//! history as merging it once.

use fisca_catalog::{ObligationCatalog, ObligationDefinition};
use fisca_core::temporal::quarter_of;
use fisca_core::{AmountInput, DateRange, EntryStatus, ObligationFamily, PeriodKey, Periodicity};

use crate::error::EngineError;
use crate::history::FiscalHistory;
use crate::instance::{ObligationInstance, PeriodEntry};
use crate::normalize::{definition_of, normalize_instance};

/// Replace the records of `code` with the entries of `instance`.
///
/// Refuses an instance that still holds an invalid amount, so no partial
/// edit is ever persisted. Returns the new history with its global status
/// recomputed.
pub fn merge(
    catalog: &ObligationCatalog,
    history: &FiscalHistory,
    code: &str,
    instance: &ObligationInstance,
) -> Result<FiscalHistory, EngineError> {
    if instance.definition_code() != code {
        return Err(EngineError::DefinitionMismatch {
            expected: code.to_string(),
            found: instance.definition_code().to_string(),
        });
    }
    let family = instance.family();
    definition_of(catalog, family, code)?;

    let normalized = normalize_instance(catalog, history.fiscal_year, instance)?;
    if let Some(first) = normalized.excluded.first() {
        return Err(first.to_error().into());
    }

    let mut merged = history.clone();
    let (removed, added) = match family {
        ObligationFamily::Payment => {
            let before = merged.payment_obligations.len();
            merged.payment_obligations.retain(|r| r.obligation_code != code);
            let removed = before - merged.payment_obligations.len();
            let added = normalized.payments.len();
            merged.payment_obligations.extend(normalized.payments);
            (removed, added)
        }
        ObligationFamily::Declaration => {
            let before = merged.declaration_obligations.len();
            merged.declaration_obligations.retain(|r| r.obligation_code != code);
            let removed = before - merged.declaration_obligations.len();
            let added = normalized.declarations.len();
            merged.declaration_obligations.extend(normalized.declarations);
            (removed, added)
        }
    };
    merged.recompute_global_status();

    tracing::info!(
        client = %history.client_id,
        fiscal_year = history.fiscal_year,
        %family,
        code,
        removed,
        added,
        global_status = %merged.global_status,
        "merged obligation into history"
    );
    Ok(merged)
}

/// Rebuild the editable instance of `code` from `history`.
///
/// An obligation with no records yields an instance with no periodicity.
pub fn extract(
    catalog: &ObligationCatalog,
    history: &FiscalHistory,
    family: ObligationFamily,
    code: &str,
) -> Result<ObligationInstance, EngineError> {
    let definition = definition_of(catalog, family, code)?;
    let rows = match family {
        ObligationFamily::Payment => payment_rows(history, definition)?,
        ObligationFamily::Declaration => declaration_rows(history, definition)?,
    };

    let Some(periodicity) = rows.first().map(|(p, _)| *p) else {
        return Ok(ObligationInstance::new(family, code));
    };
    if !definition.allows(periodicity) {
        return Err(inconsistent(code, format!("{periodicity} is not allowed")));
    }

    let mut instance = ObligationInstance::with_periodicity(family, code, periodicity);
    for (row_periodicity, entry) in rows {
        if row_periodicity != periodicity {
            return Err(inconsistent(
                code,
                format!("records mix {periodicity} and {row_periodicity}"),
            ));
        }
        let period = entry.period;
        instance.insert_entry(entry).map_err(|_| {
            inconsistent(code, format!("more than one record for {period}"))
        })?;
    }
    Ok(instance)
}

/// Ids adjusted by [`rebase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RebaseSummary {
    /// Ids the store no longer holds, cleared from the instance.
    pub cleared: usize,
    /// Store ids adopted for periods the store already holds.
    pub adopted: usize,
}

/// Align the ids of `instance` with an authoritative `history`.
///
/// Every entry ends up carrying exactly the id the history holds for its
/// period: ids the history holds for no period, or for a different one,
/// are cleared, and the history's id is adopted where the entry differs.
/// A following merge then neither references a stale id nor persists one
/// id twice.
pub fn rebase(
    catalog: &ObligationCatalog,
    instance: &mut ObligationInstance,
    history: &FiscalHistory,
) -> Result<RebaseSummary, EngineError> {
    let server = extract(
        catalog,
        history,
        instance.family(),
        instance.definition_code(),
    )?;

    let mut summary = RebaseSummary::default();
    for entry in instance.entries_mut() {
        let server_id = server.entry(entry.period).and_then(|e| e.id);
        if entry.id.is_some() && entry.id != server_id {
            entry.id = None;
            summary.cleared += 1;
        }
        if let Some(id) = server_id {
            if entry.id != Some(id) {
                entry.id = Some(id);
                summary.adopted += 1;
            }
        }
    }

    tracing::debug!(
        code = instance.definition_code(),
        cleared = summary.cleared,
        adopted = summary.adopted,
        "rebased instance on authoritative history"
    );
    Ok(summary)
}

fn inconsistent(code: &str, reason: String) -> EngineError {
    EngineError::InconsistentHistory {
        code: code.to_string(),
        reason,
    }
}

fn payment_rows(
    history: &FiscalHistory,
    definition: &ObligationDefinition,
) -> Result<Vec<(Periodicity, PeriodEntry)>, EngineError> {
    let code = definition.code.as_str();
    history
        .payment_obligations
        .iter()
        .filter(|r| r.obligation_code == code)
        .map(|r| -> Result<(Periodicity, PeriodEntry), EngineError> {
            let range = match (r.date_range_start, r.date_range_end) {
                (Some(start), Some(end)) => Some(
                    DateRange::new(start, end).map_err(|e| inconsistent(code, e.to_string()))?,
                ),
                (None, None) => None,
                _ => return Err(inconsistent(code, "date range is half set".to_string())),
            };
            let period =
                payment_key(definition, history.fiscal_year, r.periodicity, r.period_number, range)?;
            let entry = PeriodEntry {
                id: r.id,
                period,
                amount_paid: AmountInput::from_decimal(r.amount_paid),
                amount_due: r.amount_due,
                status: r.entry_status(),
                date_range: range,
                due_date: None,
                filed_date: None,
                comment: r.comment.clone(),
            };
            Ok((r.periodicity, entry))
        })
        .collect()
}

fn payment_key(
    definition: &ObligationDefinition,
    fiscal_year: i32,
    periodicity: Periodicity,
    number: Option<u8>,
    range: Option<DateRange>,
) -> Result<PeriodKey, EngineError> {
    let code = definition.code.as_str();
    if periodicity == Periodicity::Quarterly && definition.uses_date_ranges() {
        let range = range
            .ok_or_else(|| inconsistent(code, "date-range record without a range".to_string()))?;
        let quarter = quarter_of(range.start());
        if !range.starts_in_quarter(fiscal_year, quarter) {
            return Err(inconsistent(
                code,
                format!("date range starting {} in history of {fiscal_year}", range.start()),
            ));
        }
        return Ok(PeriodKey::Quarter(quarter));
    }
    PeriodKey::new(periodicity, number).map_err(|e| inconsistent(code, e.to_string()))
}

fn declaration_rows(
    history: &FiscalHistory,
    definition: &ObligationDefinition,
) -> Result<Vec<(Periodicity, PeriodEntry)>, EngineError> {
    let code = definition.code.as_str();
    history
        .declaration_obligations
        .iter()
        .filter(|r| r.obligation_code == code)
        .map(|r| -> Result<(Periodicity, PeriodEntry), EngineError> {
            if r.fiscal_year != history.fiscal_year {
                return Err(inconsistent(
                    code,
                    format!(
                        "record for fiscal year {} in history of {}",
                        r.fiscal_year, history.fiscal_year
                    ),
                ));
            }
            let entry = PeriodEntry {
                id: r.id,
                period: PeriodKey::Annual,
                amount_paid: AmountInput::from_decimal(r.declared_amount),
                amount_due: None,
                status: EntryStatus::from(r.status),
                date_range: None,
                due_date: r.due_date,
                filed_date: r.filed_date,
                comment: r.comment.clone(),
            };
            Ok((Periodicity::Annual, entry))
        })
        .collect()
}

/// Whether two amounts hold the same value, ignoring how they were typed.
pub fn same_amount(a: &AmountInput, b: &AmountInput) -> bool {
    match (a.value(), b.value()) {
        (Some(x), Some(y)) => x == y,
        _ => a.raw() == b.raw(),
    }
}
