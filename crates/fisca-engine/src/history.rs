//! # Fiscal History
//!
//! The yearly record set of one client: every payment and declaration
//! record for a fiscal year, plus a derived global status. A history is
//! created once per client and year and is afterwards rewritten one
//! obligation at a time by the reconciler; it is never partially deleted.

use serde::{Deserialize, Serialize};

use fisca_core::{ClientId, ClientProfile, EntryStatus, ObligationFamily, RecordId, ValidationError};

use crate::instance::ObligationInstance;
use crate::record::{DeclarationRecord, PaymentRecord};

/// First fiscal year accepted.
pub const MIN_FISCAL_YEAR: i32 = 2000;
/// Last fiscal year accepted.
pub const MAX_FISCAL_YEAR: i32 = 2100;

/// Overall state of a fiscal history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalStatus {
    /// Every record is paid or filed.
    UpToDate,
    /// Work remains and nothing is late.
    #[default]
    InProgress,
    /// At least one record is late.
    Late,
}

impl GlobalStatus {
    /// Return the wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpToDate => "UP_TO_DATE",
            Self::InProgress => "IN_PROGRESS",
            Self::Late => "LATE",
        }
    }

    /// Derive the global status from record statuses.
    ///
    /// LATE wins over everything; UP_TO_DATE needs at least one record and
    /// every record settled.
    pub fn derive(statuses: impl IntoIterator<Item = EntryStatus>) -> Self {
        let mut any = false;
        let mut all_settled = true;
        for status in statuses {
            if status.is_late() {
                return Self::Late;
            }
            any = true;
            all_settled &= status.is_settled();
        }
        if any && all_settled {
            Self::UpToDate
        } else {
            Self::InProgress
        }
    }
}

impl std::fmt::Display for GlobalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The yearly record set of one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalHistory {
    /// Store identity; absent until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Owning client.
    pub client_id: ClientId,
    /// Fiscal year covered.
    pub fiscal_year: i32,
    /// Operator description.
    pub description: String,
    /// Derived overall status.
    #[serde(default)]
    pub global_status: GlobalStatus,
    /// Payment records, in insertion order.
    #[serde(default)]
    pub payment_obligations: Vec<PaymentRecord>,
    /// Declaration records.
    #[serde(default)]
    pub declaration_obligations: Vec<DeclarationRecord>,
}

impl FiscalHistory {
    /// An empty, unpersisted history.
    pub fn new(client_id: ClientId, fiscal_year: i32, description: impl Into<String>) -> Self {
        Self {
            id: None,
            client_id,
            fiscal_year,
            description: description.into(),
            global_status: GlobalStatus::default(),
            payment_obligations: Vec::new(),
            declaration_obligations: Vec::new(),
        }
    }

    /// Recompute [`GlobalStatus`] from the records.
    pub fn recompute_global_status(&mut self) {
        let payments = self.payment_obligations.iter().map(PaymentRecord::entry_status);
        let declarations = self
            .declaration_obligations
            .iter()
            .map(DeclarationRecord::entry_status);
        self.global_status = GlobalStatus::derive(payments.chain(declarations));
    }

    /// Total number of records across both families.
    pub fn record_count(&self) -> usize {
        self.payment_obligations.len() + self.declaration_obligations.len()
    }

    /// Distinct obligation codes of a family, in first-seen order.
    pub fn codes(&self, family: ObligationFamily) -> Vec<&str> {
        let all: Vec<&str> = match family {
            ObligationFamily::Payment => self
                .payment_obligations
                .iter()
                .map(|r| r.obligation_code.as_str())
                .collect(),
            ObligationFamily::Declaration => self
                .declaration_obligations
                .iter()
                .map(|r| r.obligation_code.as_str())
                .collect(),
        };
        let mut out: Vec<&str> = Vec::new();
        for code in all {
            if !out.contains(&code) {
                out.push(code);
            }
        }
        out
    }

    /// Every record id held by the history.
    pub fn record_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        let payments = self.payment_obligations.iter().filter_map(|r| r.id);
        let declarations = self.declaration_obligations.iter().filter_map(|r| r.id);
        payments.chain(declarations)
    }
}

/// A history not yet submitted: what the creation form collects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDraft {
    /// Chosen client.
    #[serde(default)]
    pub client: Option<ClientProfile>,
    /// Chosen fiscal year.
    #[serde(default)]
    pub fiscal_year: Option<i32>,
    /// Operator description.
    #[serde(default)]
    pub description: String,
    /// Selected and configured obligation instances.
    #[serde(default)]
    pub obligations: Vec<ObligationInstance>,
}

impl HistoryDraft {
    /// Every validation problem of the draft, in form order.
    ///
    /// Amount problems are reported by the normalizer, which knows which
    /// entries survive client filtering.
    pub fn problems(&self) -> Vec<ValidationError> {
        let mut problems = Vec::new();
        if self.client.is_none() {
            problems.push(ValidationError::MissingClient);
        }
        match self.fiscal_year {
            Some(year) if (MIN_FISCAL_YEAR..=MAX_FISCAL_YEAR).contains(&year) => {}
            other => problems.push(ValidationError::MissingFiscalYear(other)),
        }
        if self.description.trim().is_empty() {
            problems.push(ValidationError::MissingDescription);
        }
        if self.obligations.iter().all(ObligationInstance::is_empty) {
            problems.push(ValidationError::NoObligationSelected);
        }
        problems
    }

    /// The first validation problem, if any.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }
}
