//! # Obligation Catalog
//!
//! The registry of obligation definitions, split into the payment and
//! declaration families. Codes are namespaced per family: `"TVA"` may exist
//! in both without colliding.
//!
//! The catalog is a plain value. Callers construct it (from YAML, from a
//! file, or the compiled-in default) and pass it where it is needed, so
//! tests can substitute their own rule set and the rule set can be
//! versioned independently of the code.
//!
//! ## Load-time validation
//!
//! A catalog document is rejected when:
//! - a definition has no allowed periodicity, or lists one twice;
//! - two definitions in the same family share a code;
//! - a declaration allows anything other than exactly `[ANNUAL]`;
//! - a definition uses the date-range quarter convention without allowing
//!   QUARTERLY;
//! - a due-date hint names an impossible day.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use fisca_core::{ObligationFamily, Periodicity};

use crate::definition::{ObligationDefinition, QuarterConvention};
use crate::error::CatalogError;

/// Default catalog compiled into the crate.
const BUILTIN_CATALOG: &str = include_str!("../catalog/default.yaml");

/// Serialized form of a catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Rule-set version, recorded for auditing.
    pub version: String,
    /// Payment obligation definitions ("versements").
    #[serde(default)]
    pub payments: Vec<ObligationDefinition>,
    /// Filing obligation definitions ("declarations").
    #[serde(default)]
    pub declarations: Vec<ObligationDefinition>,
}

/// Immutable, validated registry of obligation definitions.
#[derive(Debug, Clone)]
pub struct ObligationCatalog {
    version: String,
    payments: Vec<ObligationDefinition>,
    declarations: Vec<ObligationDefinition>,
    payment_index: BTreeMap<String, usize>,
    declaration_index: BTreeMap<String, usize>,
}

impl ObligationCatalog {
    /// Build a catalog from a document, validating every definition.
    pub fn from_document(doc: CatalogDocument) -> Result<Self, CatalogError> {
        let payment_index = index_family(ObligationFamily::Payment, &doc.payments)?;
        let declaration_index = index_family(ObligationFamily::Declaration, &doc.declarations)?;

        tracing::debug!(
            version = %doc.version,
            payments = doc.payments.len(),
            declarations = doc.declarations.len(),
            "loaded obligation catalog"
        );

        Ok(Self {
            version: doc.version,
            payments: doc.payments,
            declarations: doc.declarations,
            payment_index,
            declaration_index,
        })
    }

    /// Parse and validate a YAML catalog document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_yaml::from_str(yaml)?;
        Self::from_document(doc)
    }

    /// Read, parse, and validate a YAML catalog file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// The default catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Rule-set version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up a definition, failing on an unknown code.
    pub fn lookup(
        &self,
        family: ObligationFamily,
        code: &str,
    ) -> Result<&ObligationDefinition, CatalogError> {
        self.get(family, code).ok_or_else(|| CatalogError::NotFound {
            family,
            code: code.to_string(),
        })
    }

    /// Look up a definition, returning `None` on an unknown code.
    pub fn get(&self, family: ObligationFamily, code: &str) -> Option<&ObligationDefinition> {
        let (defs, index) = self.family(family);
        index.get(code).and_then(|&i| defs.get(i))
    }

    /// Whether `code` is registered in `family`.
    pub fn contains(&self, family: ObligationFamily, code: &str) -> bool {
        self.family(family).1.contains_key(code)
    }

    /// All definitions of a family, in load order.
    pub fn all(&self, family: ObligationFamily) -> &[ObligationDefinition] {
        self.family(family).0
    }

    /// Total number of definitions across both families.
    pub fn len(&self) -> usize {
        self.payments.len() + self.declarations.len()
    }

    /// Whether the catalog holds no definition at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serializable snapshot of the catalog.
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            version: self.version.clone(),
            payments: self.payments.clone(),
            declarations: self.declarations.clone(),
        }
    }

    fn family(
        &self,
        family: ObligationFamily,
    ) -> (&[ObligationDefinition], &BTreeMap<String, usize>) {
        match family {
            ObligationFamily::Payment => (self.payments.as_slice(), &self.payment_index),
            ObligationFamily::Declaration => (self.declarations.as_slice(), &self.declaration_index),
        }
    }
}

fn index_family(
    family: ObligationFamily,
    defs: &[ObligationDefinition],
) -> Result<BTreeMap<String, usize>, CatalogError> {
    let mut index = BTreeMap::new();
    for (i, def) in defs.iter().enumerate() {
        validate_definition(family, def)?;
        if index.insert(def.code.clone(), i).is_some() {
            return Err(invalid(
                family,
                &def.code,
                "code is defined more than once".to_string(),
            ));
        }
    }
    Ok(index)
}

fn validate_definition(
    family: ObligationFamily,
    def: &ObligationDefinition,
) -> Result<(), CatalogError> {
    if def.code.trim().is_empty() {
        return Err(invalid(family, &def.code, "code is empty".to_string()));
    }
    if def.allowed_periodicities.is_empty() {
        return Err(invalid(
            family,
            &def.code,
            "allowed_periodicities is empty".to_string(),
        ));
    }
    for (i, p) in def.allowed_periodicities.iter().enumerate() {
        if def.allowed_periodicities[..i].contains(p) {
            return Err(invalid(
                family,
                &def.code,
                format!("periodicity {p} is listed twice"),
            ));
        }
    }
    if family == ObligationFamily::Declaration
        && def.allowed_periodicities != [Periodicity::Annual]
    {
        return Err(invalid(
            family,
            &def.code,
            "declarations must be tracked annually".to_string(),
        ));
    }
    if def.quarter_convention == QuarterConvention::DateRange
        && !def.allows(Periodicity::Quarterly)
    {
        return Err(invalid(
            family,
            &def.code,
            "date-range convention requires QUARTERLY periodicity".to_string(),
        ));
    }
    if let Some(md) = def.due_after_year_end {
        if !md.is_valid() {
            return Err(invalid(
                family,
                &def.code,
                format!("due date {:02}-{:02} is not a calendar day", md.month, md.day),
            ));
        }
    }
    Ok(())
}

fn invalid(family: ObligationFamily, code: &str, reason: String) -> CatalogError {
    CatalogError::Invalid {
        family,
        code: code.to_string(),
        reason,
    }
}
