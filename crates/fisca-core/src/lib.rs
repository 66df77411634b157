//! # fisca-core — Foundational Types for the Obligation Engine
//!
//! This crate is the leaf of the fisca workspace. It defines the value
//! types every other crate speaks: who the client is, which period an entry
//! belongs to, what state a payment or filing is in, and how an operator's
//! typed amount is carried until it parses.
//!
//! ## Key Design Principles
//!
//! 1. **Typed period keys.** `PeriodKey::Month(3)` and `PeriodKey::Quarter(2)`
//!    replace stringly keys such as `"M3"` / `"T2"`. Keys can only be built
//!    through validated constructors, so an out-of-range month never exists.
//!
//! 2. **Closed status enums per family.** Payments ("versements") and filings
//!    ("declarations") have distinct status sets. `EntryStatus` carries one or
//!    the other, and `ObligationFamily` says which one is legal.
//!
//! 3. **Amounts as decimals.** `rust_decimal::Decimal` for every amount. The
//!    raw operator text is kept alongside in `AmountInput` so an invalid
//!    value is never silently coerced to zero.
//!
//! 4. **Newtype identifiers.** `ClientId` and `RecordId` cannot be swapped.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `fisca-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amount;
pub mod client;
pub mod error;
pub mod identity;
pub mod period;
pub mod status;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use amount::AmountInput;
pub use client::{ClientProfile, LegalForm};
pub use error::{FiscaError, ValidationError};
pub use identity::{ClientId, RecordId};
pub use period::{PeriodKey, Periodicity};
pub use status::{DeclarationStatus, EntryStatus, ObligationFamily, PaymentStatus};
pub use temporal::DateRange;
