//! # Error Types
//!
//! Two layers:
//!
//! - [`ValidationError`] covers operator input the form layer recovers from
//!   locally (a missing field, an amount that does not parse). These never
//!   reach persisted state.
//! - [`FiscaError`] covers construction failures of core values, which
//!   indicate a caller bug rather than bad operator input.

use thiserror::Error;

use crate::period::Periodicity;

/// Top-level error for core value construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FiscaError {
    /// A period number outside the valid range for its periodicity.
    #[error("period number {number} is out of range for {periodicity} (expected 1..={max})")]
    PeriodOutOfRange {
        /// Periodicity the key was requested for.
        periodicity: Periodicity,
        /// The rejected number.
        number: u8,
        /// Largest valid number for the periodicity.
        max: u8,
    },

    /// A period number supplied for ANNUAL, or omitted for MONTHLY/QUARTERLY.
    #[error("period number {number:?} does not fit periodicity {periodicity}")]
    PeriodShapeMismatch {
        /// Periodicity the key was requested for.
        periodicity: Periodicity,
        /// The supplied number, if any.
        number: Option<u8>,
    },

    /// Operator input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Operator input rejected by validation.
///
/// Each variant names the offending field so the form layer can show the
/// message inline next to it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No client was chosen for the history.
    #[error("a client must be selected")]
    MissingClient,

    /// The fiscal year is absent or outside the accepted range.
    #[error("fiscal year is required (got {0:?})")]
    MissingFiscalYear(Option<i32>),

    /// The history description is empty.
    #[error("a description is required")]
    MissingDescription,

    /// Submission with no obligation carrying at least one period.
    #[error("at least one obligation must be selected and configured")]
    NoObligationSelected,

    /// An amount field holds text that is not a non-negative number.
    #[error("amount for {code} {period} is not a non-negative number: {raw:?}")]
    InvalidAmount {
        /// Obligation code of the offending entry.
        code: String,
        /// Display form of the offending period key.
        period: String,
        /// The raw text as typed.
        raw: String,
    },

    /// A payment status was given for a declaration, or vice versa.
    #[error("status {status} does not belong to the {family} family")]
    StatusFamilyMismatch {
        /// The rejected status.
        status: String,
        /// The family the entry belongs to.
        family: String,
    },

    /// A date range whose end precedes its start.
    #[error("date range end {end} precedes start {start}")]
    InvertedDateRange {
        /// Range start.
        start: chrono::NaiveDate,
        /// Range end.
        end: chrono::NaiveDate,
    },

    /// A date range whose start lies outside the quarter it is keyed by.
    #[error("date range starting {start} does not fall in quarter {quarter} of {fiscal_year}")]
    DateRangeOutsidePeriod {
        /// Range start.
        start: chrono::NaiveDate,
        /// The quarter number of the entry.
        quarter: u8,
        /// Fiscal year of the instance.
        fiscal_year: i32,
    },

    /// A field that only applies to another family (e.g. a filed date on a
    /// payment entry).
    #[error("field {field} does not apply to {family} entries")]
    FieldNotApplicable {
        /// The rejected field.
        field: &'static str,
        /// The family the entry belongs to.
        family: String,
    },
}
