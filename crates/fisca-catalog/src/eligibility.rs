//! # Eligibility Resolution
//!
//! Decides, per definition, whether an operator may select it for a given
//! client. The decision depends only on the definition's
//! [`Restriction`] and the client's [`LegalForm`]:
//!
//! | restriction         | no client             | INDIVIDUAL | LEGAL_ENTITY | UNRECOGNIZED |
//! |---------------------|-----------------------|------------|--------------|--------------|
//! | NONE                | selectable            | selectable | selectable   | selectable   |
//! | LEGAL_ENTITY_ONLY   | "select a client first" | disabled | selectable   | disabled     |
//! | INDIVIDUAL_ONLY     | "select a client first" | selectable | disabled   | disabled     |
//!
//! An unrecognized legal form satisfies neither restriction.
//!
//! Resolution is pure and total: it never fails and reads no other state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fisca_core::{ClientProfile, LegalForm};

use crate::definition::{ObligationDefinition, Restriction};

/// Reason given for restricted definitions while no client is chosen.
pub const REASON_NO_CLIENT: &str = "select a client first";
/// Reason given for legal-entity obligations on other clients.
pub const REASON_LEGAL_ENTITY_ONLY: &str = "reserved for legal entities";
/// Reason given for individual obligations on other clients.
pub const REASON_INDIVIDUAL_ONLY: &str = "reserved for individuals";
/// Reason given for restricted definitions when the legal form is unknown.
pub const REASON_UNRECOGNIZED_FORM: &str = "client legal form is not recognized";

/// Whether a definition may be selected, and why not if it may not.
///
/// Invariant: `is_selectable == false` implies `disabled_reason.is_some()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    /// Whether the operator may select the definition.
    pub is_selectable: bool,
    /// Why the definition is disabled.
    pub disabled_reason: Option<String>,
}

impl EligibilityResult {
    /// A selectable result.
    pub fn selectable() -> Self {
        Self {
            is_selectable: true,
            disabled_reason: None,
        }
    }

    /// A disabled result with its reason.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            is_selectable: false,
            disabled_reason: Some(reason.into()),
        }
    }
}

/// Evaluate one definition for an optional client.
pub fn evaluate(definition: &ObligationDefinition, client: Option<&ClientProfile>) -> EligibilityResult {
    let Some(client) = client else {
        return if definition.is_restricted() {
            EligibilityResult::disabled(REASON_NO_CLIENT)
        } else {
            EligibilityResult::selectable()
        };
    };

    match (definition.restricted_to, client.legal_form) {
        (Restriction::None, _) => EligibilityResult::selectable(),
        (Restriction::LegalEntityOnly, LegalForm::LegalEntity)
        | (Restriction::IndividualOnly, LegalForm::Individual) => EligibilityResult::selectable(),
        (_, LegalForm::Unrecognized) => EligibilityResult::disabled(REASON_UNRECOGNIZED_FORM),
        (Restriction::LegalEntityOnly, _) => EligibilityResult::disabled(REASON_LEGAL_ENTITY_ONLY),
        (Restriction::IndividualOnly, _) => EligibilityResult::disabled(REASON_INDIVIDUAL_ONLY),
    }
}

/// Whether `client` may owe the obligation described by `definition`.
pub fn is_eligible(definition: &ObligationDefinition, client: &ClientProfile) -> bool {
    evaluate(definition, Some(client)).is_selectable
}

/// Resolve eligibility for every definition, keyed by code.
pub fn resolve(
    definitions: &[ObligationDefinition],
    client: Option<&ClientProfile>,
) -> BTreeMap<String, EligibilityResult> {
    definitions
        .iter()
        .map(|def| (def.code.clone(), evaluate(def, client)))
        .collect()
}

/// Definitions split into available and disabled sets, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct EligibilitySplit<'a> {
    /// Definitions the operator may select.
    pub available: Vec<&'a ObligationDefinition>,
    /// Definitions the operator may not select, with the reason.
    pub disabled: Vec<(&'a ObligationDefinition, String)>,
}

/// Partition definitions into available and disabled sets.
pub fn split<'a>(
    definitions: &'a [ObligationDefinition],
    client: Option<&ClientProfile>,
) -> EligibilitySplit<'a> {
    let mut out = EligibilitySplit::default();
    for def in definitions {
        let result = evaluate(def, client);
        match result.disabled_reason {
            Some(reason) if !result.is_selectable => out.disabled.push((def, reason)),
            _ => out.available.push(def),
        }
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use fisca_core::{ClientId, Periodicity};
    use proptest::prelude::*;

    fn restriction() -> impl Strategy<Value = Restriction> {
        prop_oneof![
            Just(Restriction::None),
            Just(Restriction::LegalEntityOnly),
            Just(Restriction::IndividualOnly),
        ]
    }

    fn legal_form() -> impl Strategy<Value = Option<LegalForm>> {
        prop_oneof![
            Just(None),
            Just(Some(LegalForm::Individual)),
            Just(Some(LegalForm::LegalEntity)),
            Just(Some(LegalForm::Unrecognized)),
        ]
    }

    fn definitions() -> impl Strategy<Value = Vec<ObligationDefinition>> {
        prop::collection::vec(restriction(), 0..12).prop_map(|rs| {
            rs.into_iter()
                .enumerate()
                .map(|(i, restricted_to)| ObligationDefinition {
                    code: format!("D{i}"),
                    display_name: format!("Definition {i}"),
                    category: "generated".to_string(),
                    allowed_periodicities: vec![Periodicity::Annual],
                    mandatory: false,
                    optional: false,
                    restricted_to,
                    description: String::new(),
                    quarter_convention: Default::default(),
                    due_after_year_end: None,
                })
                .collect()
        })
    }

    proptest! {
        /// A disabled result always carries a reason.
        #[test]
        fn disabled_always_has_reason(defs in definitions(), form in legal_form()) {
            let profile = form.map(|f| ClientProfile::new(ClientId(1), f));
            for result in resolve(&defs, profile.as_ref()).values() {
                prop_assert!(result.is_selectable || result.disabled_reason.is_some());
                prop_assert!(!result.is_selectable || result.disabled_reason.is_none());
            }
        }

        /// Legal-entity-only definitions are never selectable for individuals.
        #[test]
        fn legal_entity_only_rejects_individuals(defs in definitions()) {
            let profile = ClientProfile::new(ClientId(1), LegalForm::Individual);
            let out = resolve(&defs, Some(&profile));
            for def in defs.iter().filter(|d| d.restricted_to == Restriction::LegalEntityOnly) {
                prop_assert!(!out[&def.code].is_selectable);
                prop_assert!(out[&def.code].disabled_reason.is_some());
            }
        }

        /// Resolution yields exactly one result per definition.
        #[test]
        fn one_result_per_definition(defs in definitions(), form in legal_form()) {
            let profile = form.map(|f| ClientProfile::new(ClientId(1), f));
            prop_assert_eq!(resolve(&defs, profile.as_ref()).len(), defs.len());
        }
    }
}
