//! # History Subcommands
//!
//! File-based access to the reconciler:
//!
//! - `fisca missing --history h.json --family payment --code TVA`
//! - `fisca extract --history h.json --family payment --code TVA`
//! - `fisca merge --history h.json --instance tva.json [--output out.json]`
//!
//! Histories are the canonical JSON records; instances are the JSON form of
//! an obligation instance as produced by `extract`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use fisca_engine::{FiscalHistory, MissingPeriods, ObligationInstance, ObligationService};

use crate::config::CliConfig;
use crate::{read_json, write_json, FamilyArg};

/// Selects one obligation of a history file.
#[derive(Args, Debug)]
pub struct ObligationArgs {
    /// Fiscal history JSON file.
    #[arg(long)]
    pub history: PathBuf,

    /// Family of the obligation.
    #[arg(long, value_enum)]
    pub family: FamilyArg,

    /// Obligation code.
    #[arg(long)]
    pub code: String,
}

/// Arguments for the `fisca missing` subcommand.
#[derive(Args, Debug)]
pub struct MissingArgs {
    #[command(flatten)]
    pub obligation: ObligationArgs,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `fisca extract` subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub obligation: ObligationArgs,

    /// Write the instance here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `fisca merge` subcommand.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Fiscal history JSON file.
    #[arg(long)]
    pub history: PathBuf,

    /// Edited obligation instance JSON file.
    #[arg(long)]
    pub instance: PathBuf,

    /// Write the merged history here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

fn service(config: &CliConfig) -> Result<ObligationService> {
    Ok(ObligationService::new(Arc::new(config.load_catalog()?)))
}

fn extract_instance(svc: &ObligationService, args: &ObligationArgs) -> Result<ObligationInstance> {
    let history: FiscalHistory = read_json(&args.history)?;
    svc.extract(&history, args.family.into(), &args.code)
        .with_context(|| format!("cannot extract {} from {}", args.code, args.history.display()))
}

/// Execute the missing subcommand.
pub fn run_missing(args: &MissingArgs, config: &CliConfig) -> Result<u8> {
    let svc = service(config)?;
    let instance = extract_instance(&svc, &args.obligation)?;
    let report = svc.missing(&instance);
    if args.json {
        write_json(&report, None)?;
    } else {
        print!("{}", render_missing(&instance, &report));
    }
    Ok(0)
}

/// Execute the extract subcommand.
pub fn run_extract(args: &ExtractArgs, config: &CliConfig) -> Result<u8> {
    let svc = service(config)?;
    let instance = extract_instance(&svc, &args.obligation)?;
    write_json(&instance, args.output.as_deref())?;
    Ok(0)
}

/// Execute the merge subcommand.
///
/// Returns exit code 1 when the instance holds operator errors (invalid
/// amounts); other failures are operational errors.
pub fn run_merge(args: &MergeArgs, config: &CliConfig) -> Result<u8> {
    let svc = service(config)?;
    let history: FiscalHistory = read_json(&args.history)?;
    let instance: ObligationInstance = read_json(&args.instance)?;
    match svc.merge(&history, &instance) {
        Ok(merged) => {
            write_json(&merged, args.output.as_deref())?;
            Ok(0)
        }
        Err(e) if e.is_recoverable() => {
            println!("FAIL: {e}");
            Ok(1)
        }
        Err(e) => Err(e).context("merge failed"),
    }
}

/// Text report of missing periods.
pub fn render_missing(instance: &ObligationInstance, report: &MissingPeriods) -> String {
    let Some(periodicity) = instance.periodicity() else {
        return format!(
            "{}: no periodicity chosen, nothing to report\n",
            instance.definition_code()
        );
    };
    if report.is_complete() {
        return format!(
            "{} ({periodicity}): all {} periods present\n",
            instance.definition_code(),
            instance.len()
        );
    }
    let keys: Vec<String> = report
        .ordered_missing_keys
        .iter()
        .map(ToString::to_string)
        .collect();
    let next = report
        .next
        .map(|k| k.to_string())
        .unwrap_or_default();
    format!(
        "{} ({periodicity}): {} missing: {}\nnext: {next}\n",
        instance.definition_code(),
        report.count,
        keys.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fisca_core::{ClientId, ObligationFamily, PaymentStatus, PeriodKey, Periodicity};
    use fisca_engine::{missing, normalize_instance, PaymentRecord, PeriodEntry};

    fn history_with_tva(months: &[u8]) -> FiscalHistory {
        let catalog = fisca_catalog::ObligationCatalog::builtin().unwrap();
        let mut inst = ObligationInstance::with_periodicity(
            ObligationFamily::Payment,
            "TVA",
            Periodicity::Monthly,
        );
        for m in months {
            inst.insert_entry(
                PeriodEntry::empty(PeriodKey::Month(*m), ObligationFamily::Payment)
                    .with_amount("10")
                    .with_status(PaymentStatus::Paid),
            )
            .unwrap();
        }
        let mut history = FiscalHistory::new(ClientId(1), 2024, "FY2024");
        history.payment_obligations = normalize_instance(&catalog, 2024, &inst).unwrap().payments;
        history
    }

    fn write(dir: &std::path::Path, name: &str, value: &impl serde::Serialize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_render_missing() {
        let history = history_with_tva(&[1, 3]);
        let svc = ObligationService::new(Arc::new(
            fisca_catalog::ObligationCatalog::builtin().unwrap(),
        ));
        let inst = svc
            .extract(&history, ObligationFamily::Payment, "TVA")
            .unwrap();
        let text = render_missing(&inst, &missing(&inst));
        assert!(text.starts_with("TVA (MONTHLY): 10 missing: month 2, month 4"));
        assert!(text.ends_with("next: month 2\n"));
    }

    #[test]
    fn test_render_missing_without_periodicity() {
        let inst = ObligationInstance::new(ObligationFamily::Payment, "TSC");
        let text = render_missing(&inst, &missing(&inst));
        assert_eq!(text, "TSC: no periodicity chosen, nothing to report\n");
    }

    #[test]
    fn test_extract_then_merge_files() {
        let dir = tempfile::tempdir().unwrap();
        let history_path = write(dir.path(), "history.json", &history_with_tva(&[1, 2]));
        let instance_path = dir.path().join("tva.json");
        let config = CliConfig::default();

        let code = run_extract(
            &ExtractArgs {
                obligation: ObligationArgs {
                    history: history_path.clone(),
                    family: FamilyArg::Payment,
                    code: "TVA".to_string(),
                },
                output: Some(instance_path.clone()),
            },
            &config,
        )
        .unwrap();
        assert_eq!(code, 0);

        let mut instance: ObligationInstance = read_json(&instance_path).unwrap();
        assert_eq!(instance.len(), 2);
        instance
            .insert_entry(PeriodEntry::empty(PeriodKey::Month(3), ObligationFamily::Payment))
            .unwrap();
        let edited_path = write(dir.path(), "tva-edited.json", &instance);

        let merged_path = dir.path().join("merged.json");
        let code = run_merge(
            &MergeArgs {
                history: history_path,
                instance: edited_path,
                output: Some(merged_path.clone()),
            },
            &config,
        )
        .unwrap();
        assert_eq!(code, 0);
        let merged: FiscalHistory = read_json(&merged_path).unwrap();
        let records: Vec<&PaymentRecord> = merged.payment_obligations.iter().collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].period_number, Some(3));
    }

    #[test]
    fn test_merge_invalid_amount_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let history_path = write(dir.path(), "history.json", &history_with_tva(&[]));
        let mut instance = ObligationInstance::with_periodicity(
            ObligationFamily::Payment,
            "TVA",
            Periodicity::Monthly,
        );
        instance
            .insert_entry(
                PeriodEntry::empty(PeriodKey::Month(1), ObligationFamily::Payment)
                    .with_amount("twelve"),
            )
            .unwrap();
        let instance_path = write(dir.path(), "tva.json", &instance);
        let code = run_merge(
            &MergeArgs {
                history: history_path,
                instance: instance_path,
                output: Some(dir.path().join("out.json")),
            },
            &CliConfig::default(),
        )
        .unwrap();
        assert_eq!(code, 1);
        assert!(!dir.path().join("out.json").exists());
    }

    #[test]
    fn test_merge_unknown_code_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let history_path = write(dir.path(), "history.json", &history_with_tva(&[]));
        let instance = ObligationInstance::new(ObligationFamily::Payment, "NOPE");
        let instance_path = write(dir.path(), "nope.json", &instance);
        assert!(run_merge(
            &MergeArgs {
                history: history_path,
                instance: instance_path,
                output: None,
            },
            &CliConfig::default(),
        )
        .is_err());
    }
}
