//! # Obligation Service
//!
//! Single entry point over the catalog, the eligibility resolver, the
//! period configurator, the missing-period calculator, the normalizer and
//! the reconciler. Histories flow through explicitly: every operation takes
//! the history (or the creation draft) it works on and returns a new value.

use std::collections::BTreeMap;
use std::sync::Arc;

use fisca_catalog::{eligibility, EligibilityResult, ObligationCatalog};
use fisca_core::{ClientProfile, ObligationFamily, ValidationError};

use crate::configurator::PeriodConfigurator;
use crate::error::EngineError;
use crate::history::{FiscalHistory, HistoryDraft, MAX_FISCAL_YEAR, MIN_FISCAL_YEAR};
use crate::instance::ObligationInstance;
use crate::missing::{missing, MissingPeriods};
use crate::normalize::{definition_of, normalize_selection};
use crate::reconcile::{self, RebaseSummary};
use crate::store::HistoryStore;

/// Facade over the obligation engine.
#[derive(Debug, Clone)]
pub struct ObligationService {
    catalog: Arc<ObligationCatalog>,
}

impl ObligationService {
    /// Create a service over `catalog`.
    pub fn new(catalog: Arc<ObligationCatalog>) -> Self {
        Self { catalog }
    }

    /// The catalog in use.
    pub fn catalog(&self) -> &ObligationCatalog {
        &self.catalog
    }

    /// Eligibility of every definition of `family` for an optional client.
    pub fn eligibility(
        &self,
        family: ObligationFamily,
        client: Option<&ClientProfile>,
    ) -> BTreeMap<String, EligibilityResult> {
        eligibility::resolve(self.catalog.all(family), client)
    }

    /// A blank instance for `code`.
    ///
    /// Definitions with a single allowed periodicity get it preset.
    pub fn start_instance(
        &self,
        family: ObligationFamily,
        code: &str,
    ) -> Result<ObligationInstance, EngineError> {
        let definition = definition_of(&self.catalog, family, code)?;
        Ok(match definition.allowed_periodicities.as_slice() {
            [only] => ObligationInstance::with_periodicity(family, code, *only),
            _ => ObligationInstance::new(family, code),
        })
    }

    /// A configurator for `code` in `fiscal_year`.
    ///
    /// The year must lie in the range a history accepts.
    pub fn configurator(
        &self,
        family: ObligationFamily,
        code: &str,
        fiscal_year: i32,
    ) -> Result<PeriodConfigurator<'_>, EngineError> {
        if !(MIN_FISCAL_YEAR..=MAX_FISCAL_YEAR).contains(&fiscal_year) {
            return Err(ValidationError::MissingFiscalYear(Some(fiscal_year)).into());
        }
        let definition = definition_of(&self.catalog, family, code)?;
        Ok(PeriodConfigurator::new(definition, family, fiscal_year))
    }

    /// Missing periods of `instance`.
    pub fn missing(&self, instance: &ObligationInstance) -> MissingPeriods {
        missing(instance)
    }

    /// Build a new history from a creation draft.
    ///
    /// The draft must name a client, a fiscal year and a description, and
    /// carry at least one obligation with entries the client is eligible
    /// for. Any invalid amount refuses the whole draft.
    pub fn create_history(&self, draft: &HistoryDraft) -> Result<FiscalHistory, EngineError> {
        draft.validate()?;
        let (Some(client), Some(fiscal_year)) = (draft.client.as_ref(), draft.fiscal_year) else {
            return Err(ValidationError::MissingClient.into());
        };

        let normalized =
            normalize_selection(&self.catalog, fiscal_year, Some(client), &draft.obligations)?;
        if let Some(first) = normalized.excluded.first() {
            return Err(first.to_error().into());
        }
        if normalized.record_count() == 0 {
            return Err(ValidationError::NoObligationSelected.into());
        }

        let mut history =
            FiscalHistory::new(client.client_id, fiscal_year, draft.description.trim());
        history.payment_obligations = normalized.payments;
        history.declaration_obligations = normalized.declarations;
        history.recompute_global_status();
        tracing::info!(
            client = %client.client_id,
            fiscal_year,
            records = history.record_count(),
            global_status = %history.global_status,
            "fiscal history drafted"
        );
        Ok(history)
    }

    /// Merge an edited instance back into `history`.
    pub fn merge(
        &self,
        history: &FiscalHistory,
        instance: &ObligationInstance,
    ) -> Result<FiscalHistory, EngineError> {
        reconcile::merge(&self.catalog, history, instance.definition_code(), instance)
    }

    /// The editable instance of `code` in `history`.
    pub fn extract(
        &self,
        history: &FiscalHistory,
        family: ObligationFamily,
        code: &str,
    ) -> Result<ObligationInstance, EngineError> {
        reconcile::extract(&self.catalog, history, family, code)
    }

    /// Align `instance` ids with an authoritative `history`.
    pub fn rebase(
        &self,
        instance: &mut ObligationInstance,
        history: &FiscalHistory,
    ) -> Result<RebaseSummary, EngineError> {
        reconcile::rebase(&self.catalog, instance, history)
    }

    /// Validate a draft and persist it as a new history.
    pub fn persist_new(
        &self,
        store: &dyn HistoryStore,
        draft: &HistoryDraft,
    ) -> Result<FiscalHistory, EngineError> {
        let history = self.create_history(draft)?;
        Ok(store.create(history)?)
    }

    /// Load, merge and save one edited obligation.
    pub fn persist_edit(
        &self,
        store: &dyn HistoryStore,
        client_id: fisca_core::ClientId,
        fiscal_year: i32,
        instance: &ObligationInstance,
    ) -> Result<FiscalHistory, EngineError> {
        let current = store.load(client_id, fiscal_year)?;
        let merged = self.merge(&current, instance)?;
        Ok(store.save(merged)?)
    }
}
