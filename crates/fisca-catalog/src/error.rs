//! # Catalog Errors

use std::path::PathBuf;

use thiserror::Error;

use fisca_core::ObligationFamily;

/// Errors raised while loading or querying an obligation catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No definition with this code exists in the family.
    #[error("unknown {family} obligation code {code:?}")]
    NotFound {
        /// Family that was searched.
        family: ObligationFamily,
        /// The unknown code.
        code: String,
    },

    /// A definition failed load-time validation.
    #[error("invalid {family} definition {code:?}: {reason}")]
    Invalid {
        /// Family of the definition.
        family: ObligationFamily,
        /// Code of the definition.
        code: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The YAML document could not be parsed.
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The catalog file could not be read.
    #[error("cannot read catalog {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}
