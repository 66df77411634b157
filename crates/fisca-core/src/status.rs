//! # Obligation Families and Statuses
//!
//! Payment obligations ("versements") and filing obligations
//! ("declarations") live in separate namespaces and have separate status
//! sets. An entry's [`EntryStatus`] always matches its family; the
//! configurator rejects a status from the other family.

use serde::{Deserialize, Serialize};

/// The two obligation families. Codes are unique only within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObligationFamily {
    /// Tax payments tracked per period.
    Payment,
    /// Tax filings, tracked once per fiscal year.
    Declaration,
}

impl ObligationFamily {
    /// Return the string representation of this family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Declaration => "declaration",
        }
    }

    /// Status given to a freshly added entry of this family.
    pub fn initial_status(&self) -> EntryStatus {
        match self {
            Self::Payment => EntryStatus::Payment(PaymentStatus::Unpaid),
            Self::Declaration => EntryStatus::Declaration(DeclarationStatus::NotFiled),
        }
    }
}

impl std::fmt::Display for ObligationFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settlement state of a payment entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Nothing paid yet.
    #[default]
    Unpaid,
    /// Fully paid.
    Paid,
    /// Paid after the deadline, or overdue.
    Late,
    /// Partially paid.
    Partial,
}

impl PaymentStatus {
    /// Return the wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::Paid => "PAID",
            Self::Late => "LATE",
            Self::Partial => "PARTIAL",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filing state of a declaration entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeclarationStatus {
    /// Not filed yet.
    #[default]
    NotFiled,
    /// Filed.
    Filed,
    /// Filed after the deadline, or overdue.
    Late,
}

impl DeclarationStatus {
    /// Return the wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFiled => "NOT_FILED",
            Self::Filed => "FILED",
            Self::Late => "LATE",
        }
    }
}

impl std::fmt::Display for DeclarationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a period entry, tagged by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    /// Status of a payment entry.
    Payment(PaymentStatus),
    /// Status of a declaration entry.
    Declaration(DeclarationStatus),
}

impl EntryStatus {
    /// The family this status belongs to.
    pub fn family(&self) -> ObligationFamily {
        match self {
            Self::Payment(_) => ObligationFamily::Payment,
            Self::Declaration(_) => ObligationFamily::Declaration,
        }
    }

    /// Whether the obligation is settled (paid or filed).
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::Payment(PaymentStatus::Paid) | Self::Declaration(DeclarationStatus::Filed)
        )
    }

    /// Whether the obligation is late.
    pub fn is_late(&self) -> bool {
        matches!(
            self,
            Self::Payment(PaymentStatus::Late) | Self::Declaration(DeclarationStatus::Late)
        )
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Payment(s) => f.write_str(s.as_str()),
            Self::Declaration(s) => f.write_str(s.as_str()),
        }
    }
}

impl From<PaymentStatus> for EntryStatus {
    fn from(status: PaymentStatus) -> Self {
        Self::Payment(status)
    }
}

impl From<DeclarationStatus> for EntryStatus {
    fn from(status: DeclarationStatus) -> Self {
        Self::Declaration(status)
    }
}
