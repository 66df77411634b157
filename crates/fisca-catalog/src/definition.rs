//! # Obligation Definitions
//!
//! One [`ObligationDefinition`] per obligation code: what the obligation is
//! called, which periodicities it may be tracked at, and which clients may
//! owe it. Definitions are immutable once a catalog is loaded.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use fisca_core::Periodicity;

/// Which legal forms an obligation is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Restriction {
    /// Any client may owe it.
    #[default]
    None,
    /// Only registered legal entities.
    LegalEntityOnly,
    /// Only natural persons.
    IndividualOnly,
}

impl Restriction {
    /// Return the wire representation of this restriction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::LegalEntityOnly => "LEGAL_ENTITY_ONLY",
            Self::IndividualOnly => "INDIVIDUAL_ONLY",
        }
    }
}

impl std::fmt::Display for Restriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How quarterly periods of an obligation are identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuarterConvention {
    /// Quarters are numbered 1–4; records carry `periodNumber`.
    #[default]
    Numbered,
    /// Quarters are explicit date ranges; records carry `dateRangeStart` /
    /// `dateRangeEnd` and no period number.
    DateRange,
}

/// A month/day pair in the year following the fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthDay {
    /// Month, 1–12.
    pub month: u32,
    /// Day of month.
    pub day: u32,
}

impl MonthDay {
    /// Whether the pair names a real calendar day in at least leap years.
    pub fn is_valid(&self) -> bool {
        NaiveDate::from_ymd_opt(2000, self.month, self.day).is_some()
    }

    /// Resolve to a date in `year`. A 29 February in a common year falls
    /// back to 28 February.
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day).or_else(|| {
            if self.month == 2 && self.day == 29 {
                NaiveDate::from_ymd_opt(year, 2, 28)
            } else {
                None
            }
        })
    }
}

/// Immutable definition of one obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationDefinition {
    /// Unique key within the obligation's family (e.g. `"TVA"`).
    pub code: String,
    /// Label shown to operators and written as the record `type`.
    pub display_name: String,
    /// Grouping label.
    pub category: String,
    /// Allowed periodicities, in order of preference. Never empty.
    pub allowed_periodicities: Vec<Periodicity>,
    /// Whether the obligation is legally mandatory for eligible clients.
    #[serde(default)]
    pub mandatory: bool,
    /// Whether the obligation is offered as an opt-in extra.
    #[serde(default)]
    pub optional: bool,
    /// Legal-form restriction.
    #[serde(default)]
    pub restricted_to: Restriction,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Quarterly period convention.
    #[serde(default)]
    pub quarter_convention: QuarterConvention,
    /// Due date of a filing, relative to the end of the fiscal year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_after_year_end: Option<MonthDay>,
}

impl ObligationDefinition {
    /// Whether `periodicity` is one of the allowed periodicities.
    pub fn allows(&self, periodicity: Periodicity) -> bool {
        self.allowed_periodicities.contains(&periodicity)
    }

    /// The preferred periodicity (first allowed).
    pub fn default_periodicity(&self) -> Option<Periodicity> {
        self.allowed_periodicities.first().copied()
    }

    /// Whether quarterly periods are identified by date ranges.
    pub fn uses_date_ranges(&self) -> bool {
        self.quarter_convention == QuarterConvention::DateRange
    }

    /// Whether eligibility depends on the client's legal form.
    pub fn is_restricted(&self) -> bool {
        self.restricted_to != Restriction::None
    }

    /// Due date of the filing for `fiscal_year`, when the definition has one
    /// and the following year is representable.
    pub fn due_date_for(&self, fiscal_year: i32) -> Option<NaiveDate> {
        let md = self.due_after_year_end?;
        md.in_year(fiscal_year.checked_add(1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tva() -> ObligationDefinition {
        ObligationDefinition {
            code: "TVA".to_string(),
            display_name: "Taxe sur la valeur ajoutée".to_string(),
            category: "TVA".to_string(),
            allowed_periodicities: vec![Periodicity::Monthly, Periodicity::Quarterly],
            mandatory: true,
            optional: false,
            restricted_to: Restriction::None,
            description: String::new(),
            quarter_convention: QuarterConvention::Numbered,
            due_after_year_end: None,
        }
    }

    #[test]
    fn test_allows_and_default() {
        let def = tva();
        assert!(def.allows(Periodicity::Monthly));
        assert!(!def.allows(Periodicity::Annual));
        assert_eq!(def.default_periodicity(), Some(Periodicity::Monthly));
        assert!(!def.uses_date_ranges());
        assert!(!def.is_restricted());
    }

    #[test]
    fn test_due_date_in_following_year() {
        let mut def = tva();
        def.due_after_year_end = Some(MonthDay { month: 3, day: 31 });
        assert_eq!(
            def.due_date_for(2024),
            NaiveDate::from_ymd_opt(2025, 3, 31)
        );
        assert_eq!(def.due_date_for(i32::MAX), None);
        assert_eq!(def.due_date_for(i32::MIN), None);
    }

    #[test]
    fn test_leap_day_falls_back() {
        let md = MonthDay { month: 2, day: 29 };
        assert!(md.is_valid());
        assert_eq!(md.in_year(2025), NaiveDate::from_ymd_opt(2025, 2, 28));
        assert_eq!(md.in_year(2024), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert!(!MonthDay { month: 4, day: 31 }.is_valid());
    }

    #[test]
    fn test_yaml_defaults() {
        let yaml = "
code: CNSS
display_name: Cotisations CNSS
category: Social
allowed_periodicities: [MONTHLY]
";
        let def: ObligationDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.restricted_to, Restriction::None);
        assert_eq!(def.quarter_convention, QuarterConvention::Numbered);
        assert!(!def.mandatory);
        assert!(def.due_after_year_end.is_none());
    }
}
