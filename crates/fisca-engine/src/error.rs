//! # Engine Errors
//!
//! Three kinds of failure, handled differently by callers:
//!
//! - **Validation** ([`ValidationError`]): operator input the form layer
//!   shows inline and recovers from. Never reaches persisted state.
//! - **Precondition** (`InvalidPeriodicity`, `PeriodNotFound`,
//!   `UnknownObligation`, `DefinitionMismatch`, `DuplicatePeriod`,
//!   `DuplicateInstance`): the caller broke a contract. These are defects;
//!   they fail loudly instead of degrading.
//! - **Store** ([`StoreError`]): persistence outcomes. A stale id is
//!   recoverable by re-fetching, rebasing, and merging again.

use thiserror::Error;

use fisca_catalog::CatalogError;
use fisca_core::{ClientId, FiscaError, ObligationFamily, PeriodKey, RecordId, ValidationError};

/// Errors raised by the obligation engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A periodicity the definition does not allow, a key of the wrong
    /// periodicity, or an operation that needs a periodicity before one is
    /// set.
    #[error("invalid periodicity for {code}: {reason}")]
    InvalidPeriodicity {
        /// Obligation code.
        code: String,
        /// What was wrong.
        reason: String,
    },

    /// No entry exists for the period key.
    #[error("no {period} entry in {code}")]
    PeriodNotFound {
        /// Obligation code.
        code: String,
        /// The missing key.
        period: PeriodKey,
    },

    /// An entry for the period key already exists.
    #[error("{code} already has a {period} entry")]
    DuplicatePeriod {
        /// Obligation code.
        code: String,
        /// The duplicated key.
        period: PeriodKey,
    },

    /// The code is not registered in the catalog for its family.
    #[error("unknown {family} obligation {code:?}")]
    UnknownObligation {
        /// Family searched.
        family: ObligationFamily,
        /// The unregistered code.
        code: String,
    },

    /// An instance was handed to a component bound to another obligation.
    #[error("instance {found} does not match obligation {expected}")]
    DefinitionMismatch {
        /// Code the component is bound to.
        expected: String,
        /// Code carried by the instance.
        found: String,
    },

    /// Two instances for the same obligation in one selection.
    #[error("{family} obligation {code} is selected more than once")]
    DuplicateInstance {
        /// Family of the obligation.
        family: ObligationFamily,
        /// The repeated code.
        code: String,
    },

    /// Persisted records for one obligation cannot be turned back into an
    /// instance.
    #[error("inconsistent history for {code}: {reason}")]
    InconsistentHistory {
        /// Obligation code.
        code: String,
        /// What was inconsistent.
        reason: String,
    },

    /// Operator input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A core value could not be constructed.
    #[error(transparent)]
    Core(#[from] FiscaError),

    /// The catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The persistence layer rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Whether the error is recoverable by the operator (bad input or a
    /// stale view of persisted data) rather than a programming defect.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Core(FiscaError::Validation(_)) | Self::Store(_)
        )
    }
}

/// Errors raised by a [`crate::store::HistoryStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record references an id the store no longer holds.
    #[error("record {id} no longer exists for {client_id} fiscal year {fiscal_year}")]
    StalePersistenceId {
        /// The stale id.
        id: RecordId,
        /// Client of the history.
        client_id: ClientId,
        /// Fiscal year of the history.
        fiscal_year: i32,
    },

    /// No history exists for the client and year.
    #[error("no fiscal history for {client_id} fiscal year {fiscal_year}")]
    HistoryNotFound {
        /// Client searched.
        client_id: ClientId,
        /// Fiscal year searched.
        fiscal_year: i32,
    },

    /// A history already exists for the client and year.
    #[error("a fiscal history already exists for {client_id} fiscal year {fiscal_year}")]
    HistoryExists {
        /// Client of the history.
        client_id: ClientId,
        /// Fiscal year of the history.
        fiscal_year: i32,
    },
}
