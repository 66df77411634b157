//! # fisca-catalog — Obligation Catalog and Eligibility
//!
//! Holds the rule tables of the obligation engine:
//!
//! - [`ObligationCatalog`]: the validated registry of payment and declaration
//!   definitions, loaded from YAML or from the compiled-in default.
//! - [`eligibility`]: resolution of which definitions a client may select,
//!   given its legal form.
//!
//! The catalog is injected wherever it is needed; there is no global
//! instance.

pub mod catalog;
pub mod definition;
pub mod eligibility;
pub mod error;

pub use catalog::{CatalogDocument, ObligationCatalog};
pub use definition::{MonthDay, ObligationDefinition, QuarterConvention, Restriction};
pub use eligibility::{resolve, EligibilityResult, EligibilitySplit};
pub use error::CatalogError;
