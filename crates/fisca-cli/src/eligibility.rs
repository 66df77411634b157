//! # Eligibility Subcommand
//!
//! `fisca eligibility --legal-form individual` shows which definitions an
//! operator may select for a client of that legal form, and why the others
//! are disabled. Without `--legal-form`, shows the no-client view.

use anyhow::Result;
use clap::{Args, ValueEnum};

use fisca_catalog::{eligibility, ObligationCatalog};
use fisca_core::{ClientId, ClientProfile, LegalForm, ObligationFamily};

use crate::config::CliConfig;
use crate::FamilyArg;

/// Legal form as a command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LegalFormArg {
    /// Natural person.
    Individual,
    /// Registered legal entity.
    LegalEntity,
}

impl From<LegalFormArg> for LegalForm {
    fn from(arg: LegalFormArg) -> Self {
        match arg {
            LegalFormArg::Individual => LegalForm::Individual,
            LegalFormArg::LegalEntity => LegalForm::LegalEntity,
        }
    }
}

/// Arguments for the `fisca eligibility` subcommand.
#[derive(Args, Debug)]
pub struct EligibilityArgs {
    /// Legal form of the client; omit for the no-client view.
    #[arg(long, value_enum)]
    pub legal_form: Option<LegalFormArg>,

    /// Client id, echoed in JSON output.
    #[arg(long, default_value_t = 0)]
    pub client_id: i64,

    /// Only resolve one family.
    #[arg(long, value_enum)]
    pub family: Option<FamilyArg>,

    /// Print the results as JSON.
    #[arg(long)]
    pub json: bool,
}

impl EligibilityArgs {
    fn client(&self) -> Option<ClientProfile> {
        self.legal_form
            .map(|form| ClientProfile::new(ClientId(self.client_id), form.into()))
    }
}

/// Execute the eligibility subcommand.
pub fn run_eligibility(args: &EligibilityArgs, config: &CliConfig) -> Result<u8> {
    let catalog = config.load_catalog()?;
    let client = args.client();
    let families = selected_families(args.family);

    if args.json {
        let report: serde_json::Map<String, serde_json::Value> = families
            .iter()
            .map(|f| {
                let resolved = eligibility::resolve(catalog.all(*f), client.as_ref());
                serde_json::to_value(resolved).map(|v| (f.as_str().to_string(), v))
            })
            .collect::<Result<_, _>>()?;
        crate::write_json(&report, None)?;
    } else {
        print!("{}", render_eligibility(&catalog, &families, client.as_ref()));
    }
    Ok(0)
}

/// Text report: available definitions, then disabled ones with reasons.
pub fn render_eligibility(
    catalog: &ObligationCatalog,
    families: &[ObligationFamily],
    client: Option<&ClientProfile>,
) -> String {
    let mut out = match client {
        Some(c) => format!("Eligibility for {} ({})\n", c.client_id, c.legal_form),
        None => "Eligibility with no client selected\n".to_string(),
    };
    for family in families {
        let split = eligibility::split(catalog.all(*family), client);
        out.push_str(&format!("\n{}s:\n", family.as_str()));
        for def in &split.available {
            out.push_str(&format!("  + {}\n", def.code));
        }
        for (def, reason) in &split.disabled {
            out.push_str(&format!("  - {} ({reason})\n", def.code));
        }
    }
    out
}

fn selected_families(family: Option<FamilyArg>) -> Vec<ObligationFamily> {
    match family {
        Some(f) => vec![f.into()],
        None => vec![ObligationFamily::Payment, ObligationFamily::Declaration],
    }
}
