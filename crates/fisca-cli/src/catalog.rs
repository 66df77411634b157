//! # Catalog Subcommands
//!
//! `fisca catalog` lists the definitions of the active catalog;
//! `fisca validate-catalog PATH` checks a catalog file before it is
//! deployed.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use fisca_catalog::{ObligationCatalog, ObligationDefinition};
use fisca_core::ObligationFamily;

use crate::config::CliConfig;
use crate::FamilyArg;

/// Arguments for the `fisca catalog` subcommand.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Only list one family.
    #[arg(long, value_enum)]
    pub family: Option<FamilyArg>,

    /// Print the catalog as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `fisca validate-catalog` subcommand.
#[derive(Args, Debug)]
pub struct ValidateCatalogArgs {
    /// Catalog YAML file to validate.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Execute the catalog subcommand.
pub fn run_catalog(args: &CatalogArgs, config: &CliConfig) -> Result<u8> {
    let catalog = config.load_catalog()?;
    if args.json {
        crate::write_json(&catalog.to_document(), None)?;
    } else {
        print!("{}", render_catalog(&catalog, args.family.map(Into::into)));
    }
    Ok(0)
}

/// Execute the validate-catalog subcommand.
///
/// Returns exit code 0 when the file is a valid catalog, 1 otherwise.
pub fn run_validate_catalog(args: &ValidateCatalogArgs) -> Result<u8> {
    match ObligationCatalog::from_path(&args.path) {
        Ok(catalog) => {
            println!(
                "OK: {} (version {}, {} payments, {} declarations)",
                args.path.display(),
                catalog.version(),
                catalog.all(ObligationFamily::Payment).len(),
                catalog.all(ObligationFamily::Declaration).len(),
            );
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {}: {e}", args.path.display());
            Ok(1)
        }
    }
}

/// Text listing of the catalog, one definition per line.
pub fn render_catalog(catalog: &ObligationCatalog, family: Option<ObligationFamily>) -> String {
    let mut out = format!("Catalog version {}\n", catalog.version());
    for f in [ObligationFamily::Payment, ObligationFamily::Declaration] {
        if family.is_some_and(|only| only != f) {
            continue;
        }
        out.push_str(&format!("\n{}s:\n", f.as_str()));
        for def in catalog.all(f) {
            out.push_str(&render_definition(def));
        }
    }
    out
}

fn render_definition(def: &ObligationDefinition) -> String {
    let periodicities: Vec<&str> = def.allowed_periodicities.iter().map(|p| p.as_str()).collect();
    let mut flags = Vec::new();
    if def.mandatory {
        flags.push("mandatory".to_string());
    }
    if def.optional {
        flags.push("optional".to_string());
    }
    if def.is_restricted() {
        flags.push(def.restricted_to.as_str().to_lowercase());
    }
    if def.uses_date_ranges() {
        flags.push("date ranges".to_string());
    }
    format!(
        "  {:<22} {:<20} {}{}\n",
        def.code,
        periodicities.join(","),
        def.display_name,
        if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_both_families() {
        let catalog = ObligationCatalog::builtin().unwrap();
        let text = render_catalog(&catalog, None);
        assert!(text.starts_with("Catalog version"));
        assert!(text.contains("payments:"));
        assert!(text.contains("declarations:"));
        assert!(text.contains("IS_ACOMPTES"));
        assert!(text.contains("date ranges"));
    }

    #[test]
    fn test_render_single_family() {
        let catalog = ObligationCatalog::builtin().unwrap();
        let text = render_catalog(&catalog, Some(ObligationFamily::Declaration));
        assert!(!text.contains("payments:"));
        assert!(text.contains("LIASSE_FISCALE"));
    }

    #[test]
    fn test_validate_catalog_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.yaml");
        std::fs::write(
            &good,
            "version: t1\npayments:\n  - code: X\n    display_name: X\n    category: c\n    allowed_periodicities: [ANNUAL]\ndeclarations: []\n",
        )
        .unwrap();
        assert_eq!(
            run_validate_catalog(&ValidateCatalogArgs { path: good }).unwrap(),
            0
        );

        let bad = dir.path().join("bad.yaml");
        std::fs::write(
            &bad,
            "version: t1\npayments:\n  - code: X\n    display_name: X\n    category: c\n    allowed_periodicities: []\ndeclarations: []\n",
        )
        .unwrap();
        assert_eq!(
            run_validate_catalog(&ValidateCatalogArgs { path: bad }).unwrap(),
            1
        );

        let missing = dir.path().join("missing.yaml");
        assert_eq!(
            run_validate_catalog(&ValidateCatalogArgs { path: missing }).unwrap(),
            1
        );
    }
}
