//! # Amount Input
//!
//! An amount field as the operator typed it. Validation is eager: the text
//! is parsed on every change, but invalid text is kept verbatim so the
//! operator can correct it in place instead of seeing it reset to zero.
//!
//! Accepted input: an optional run of spaces as thousands separators, and a
//! single `.` or `,` as decimal separator (`"1 250,50"`, `"1250.5"`).
//! Negative values are invalid. An empty field counts as zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount as typed, with its parsed value when the text is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AmountInput {
    raw: String,
    value: Option<Decimal>,
}

impl AmountInput {
    /// Parse operator text.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = parse_non_negative(&raw);
        Self { raw, value }
    }

    /// The zero amount given to freshly added entries.
    pub fn zero() -> Self {
        Self {
            raw: "0".to_string(),
            value: Some(Decimal::ZERO),
        }
    }

    /// Wrap an already-typed decimal, e.g. from a persisted record.
    pub fn from_decimal(value: Decimal) -> Self {
        Self::parse(value.to_string())
    }

    /// The text as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed value, or `None` if the text is invalid.
    pub fn value(&self) -> Option<Decimal> {
        self.value
    }

    /// Whether the text parsed to a non-negative number.
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }
}

impl Default for AmountInput {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<String> for AmountInput {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<AmountInput> for String {
    fn from(input: AmountInput) -> Self {
        input.raw
    }
}

impl From<Decimal> for AmountInput {
    fn from(value: Decimal) -> Self {
        Self::from_decimal(value)
    }
}

impl std::fmt::Display for AmountInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_non_negative(raw: &str) -> Option<Decimal> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if compact.is_empty() {
        return Some(Decimal::ZERO);
    }
    let value: Decimal = compact.parse().ok()?;
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    Some(value.normalize())
}
