//! # fisca-engine — Obligation Configuration and Reconciliation
//!
//! The stateful half of the obligation engine. Given a catalog from
//! `fisca-catalog`, it lets an operator configure period entries for one
//! obligation at a time and reconciles them with a client's yearly
//! [`FiscalHistory`].
//!
//! ## Flow
//!
//! ```text
//! creation:  catalog → eligibility → configurator → normalizer → history
//! edit:      history → extract → configurator / missing → merge → history
//! ```
//!
//! ## Modules
//!
//! - [`instance`]: [`ObligationInstance`] and [`PeriodEntry`].
//! - [`configurator`]: [`PeriodConfigurator`], periodicity and entry edits.
//! - [`missing`]: absent periods and the next one to offer.
//! - [`record`]: canonical payment and declaration records.
//! - [`history`]: [`FiscalHistory`], global status, and creation drafts.
//! - [`normalize`]: instances to records.
//! - [`reconcile`]: merge, extract, and rebase.
//! - [`store`]: the [`HistoryStore`] port and its in-memory implementation.
//! - [`service`]: the [`ObligationService`] facade.
//!
//! All computation is synchronous. The only shared mutable state lives
//! behind a [`HistoryStore`].

pub mod configurator;
pub mod error;
pub mod history;
pub mod instance;
pub mod missing;
pub mod normalize;
pub mod reconcile;
pub mod record;
pub mod service;
pub mod store;

pub use configurator::{EntryField, PeriodConfigurator, ToggleOutcome};
pub use error::{EngineError, StoreError};
pub use history::{FiscalHistory, GlobalStatus, HistoryDraft};
pub use instance::{ObligationInstance, PeriodEntry};
pub use missing::{missing, MissingPeriods};
pub use normalize::{normalize_instance, normalize_selection, ExcludedEntry, NormalizedRecords};
pub use reconcile::{extract, merge, rebase, RebaseSummary};
pub use record::{DeclarationRecord, PaymentRecord};
pub use service::ObligationService;
pub use store::{HistoryStore, MemoryHistoryStore};
