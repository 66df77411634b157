//! # Canonical Records
//!
//! The flat record shapes a fiscal history is persisted as. One record per
//! period entry; records of one obligation share an `obligationCode`.
//!
//! ```text
//! PaymentRecord     {id?, obligationCode, type, periodicity, periodNumber,
//!                    dateRangeStart?, dateRangeEnd?, amountDue, amountPaid,
//!                    status, comment}
//! DeclarationRecord {id?, obligationCode, type, fiscalYear, filedDate,
//!                    declaredAmount, dueDate, status, mandatory, comment}
//! ```
//!
//! `periodNumber` is null for ANNUAL entries and for quarterly entries of
//! date-range obligations, whose quarter is identified by the range.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fisca_core::{DeclarationStatus, EntryStatus, PaymentStatus, Periodicity, RecordId};

/// Persisted shape of one payment period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Store identity; absent for records not yet created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Code of the obligation definition.
    pub obligation_code: String,
    /// Display name of the obligation.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Periodicity of the obligation instance.
    pub periodicity: Periodicity,
    /// Month or quarter number; null for annual and date-range entries.
    #[serde(default)]
    pub period_number: Option<u8>,
    /// First day of the period, for date-range entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range_start: Option<NaiveDate>,
    /// Last day of the period, for date-range entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range_end: Option<NaiveDate>,
    /// Amount due, when known.
    #[serde(default)]
    pub amount_due: Option<Decimal>,
    /// Amount paid.
    pub amount_paid: Decimal,
    /// Settlement state.
    pub status: PaymentStatus,
    /// Operator comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl PaymentRecord {
    /// Status tagged with its family.
    pub fn entry_status(&self) -> EntryStatus {
        self.status.into()
    }
}

/// Persisted shape of one declaration filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationRecord {
    /// Store identity; absent for records not yet created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Code of the obligation definition.
    pub obligation_code: String,
    /// Display name of the obligation.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Fiscal year the filing covers.
    pub fiscal_year: i32,
    /// Date the filing was made.
    #[serde(default)]
    pub filed_date: Option<NaiveDate>,
    /// Amount declared.
    pub declared_amount: Decimal,
    /// Filing deadline.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Filing state.
    pub status: DeclarationStatus,
    /// Whether the definition is mandatory.
    #[serde(default)]
    pub mandatory: bool,
    /// Operator comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl DeclarationRecord {
    /// Status tagged with its family.
    pub fn entry_status(&self) -> EntryStatus {
        self.status.into()
    }
}
