//! # fisca-cli — Obligation Engine Command-Line Interface
//!
//! Operator and maintenance tool over the obligation engine. Reads catalog
//! YAML and fiscal history JSON files, and writes JSON results to stdout or
//! to a file.
//!
//! ## Subcommands
//!
//! - `catalog` — list the definitions of the active catalog
//! - `validate-catalog` — load and validate a catalog file
//! - `eligibility` — which definitions a client may select
//! - `missing` — missing periods of one obligation in a history
//! - `merge` — merge an edited obligation instance into a history
//! - `extract` — extract the editable instance of one obligation
//!
//! Argument parsing lives in `main.rs`; handlers here delegate to the
//! engine crates and hold no business rules of their own.

pub mod catalog;
pub mod config;
pub mod eligibility;
pub mod history;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Serialize;

use fisca_core::ObligationFamily;

/// Obligation family as a command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FamilyArg {
    /// Payment obligations.
    Payment,
    /// Declaration obligations.
    Declaration,
}

impl From<FamilyArg> for ObligationFamily {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Payment => ObligationFamily::Payment,
            FamilyArg::Declaration => ObligationFamily::Declaration,
        }
    }
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Serialize `value` as pretty JSON to `output`, or to stdout.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    match output {
        Some(path) => std::fs::write(path, format!("{text}\n"))
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
