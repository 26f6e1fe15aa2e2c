//! # Rules Subcommand
//!
//! `lcx rules check` loads rule packs exactly as pipeline construction
//! would (layered over the builtin packs, every expression compiled, every
//! handler resolved) and reports the first load error. `lcx rules list`
//! prints the effective rule set.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use lcx_rules::{RuleEngine, RulePack};

/// Arguments for the `lcx rules` subcommand.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

/// Rule pack operations.
#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// Load and compile rule packs; exit 1 on any error.
    Check {
        /// Pack files.
        #[arg(required = true, value_name = "PACK")]
        packs: Vec<PathBuf>,

        /// Check the packs alone, without the builtin packs beneath them.
        #[arg(long)]
        standalone: bool,
    },

    /// Print the effective rule set.
    List {
        /// Extra pack files layered over the builtin packs.
        #[arg(value_name = "PACK")]
        packs: Vec<PathBuf>,
    },
}

/// Builtin packs (unless `standalone`) followed by the given files.
pub fn load_packs(paths: &[PathBuf], standalone: bool) -> Result<Vec<RulePack>> {
    let mut packs = if standalone {
        Vec::new()
    } else {
        RulePack::builtin().context("builtin rule packs failed to load")?
    };
    for path in paths {
        let pack = RulePack::from_path(path).with_context(|| format!("failed to load {}", path.display()))?;
        tracing::debug!(pack_id = %pack.pack_id, rules = pack.rules.len(), "pack parsed");
        packs.push(pack);
    }
    Ok(packs)
}

/// Execute the rules subcommand.
pub fn run_rules(args: &RulesArgs) -> Result<u8> {
    match &args.command {
        RulesCommand::Check { packs, standalone } => run_check(packs, *standalone),
        RulesCommand::List { packs } => run_list(packs),
    }
}

fn run_check(paths: &[PathBuf], standalone: bool) -> Result<u8> {
    let outcome = load_packs(paths, standalone)
        .and_then(|packs| RuleEngine::load(packs).context("rule compilation failed"));
    match outcome {
        Ok(engine) => {
            println!("OK: {} pack file(s), {} effective rule(s)", paths.len(), engine.len());
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {e:#}");
            Ok(1)
        }
    }
}

fn run_list(paths: &[PathBuf]) -> Result<u8> {
    let engine = RuleEngine::load(load_packs(paths, false)?).context("rule compilation failed")?;
    for rule in engine.rules() {
        let definition = rule.definition();
        println!(
            "{:<40} {:<10} {:<9} {:<20} {}",
            definition.id,
            definition.domain,
            definition.severity,
            rule.pack_id(),
            definition.title
        );
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pack_file(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(yaml.as_bytes()).expect("write");
        file
    }

    const OVERLAY: &str = r#"
pack_id: bank-overlay
version: "1"
tier: bank
rules:
  - id: BANK-001-INVOICE-SIGNED
    title: Invoice Not Signed
    domain: bank
    severity: minor
    applies_when: "exists(invoice)"
    check:
      expression: "invoice.signed == true"
    message: The bank requires signed invoices.
"#;

    #[test]
    fn valid_overlay_checks_clean() {
        let file = pack_file(OVERLAY);
        assert_eq!(run_check(&[file.path().to_path_buf()], false).expect("runs"), 0);
    }

    #[test]
    fn unknown_function_fails_the_check() {
        let file = pack_file(&OVERLAY.replace("invoice.signed == true", "no_such_fn(invoice.signed)"));
        assert_eq!(run_check(&[file.path().to_path_buf()], true).expect("runs"), 1);
    }

    #[test]
    fn missing_file_fails_the_check() {
        assert_eq!(run_check(&[PathBuf::from("/nonexistent/pack.yaml")], false).expect("runs"), 1);
    }

    #[test]
    fn standalone_skips_builtin_packs() {
        let file = pack_file(OVERLAY);
        let packs = load_packs(&[file.path().to_path_buf()], true).expect("loads");
        assert_eq!(packs.len(), 1);
        assert_eq!(packs[0].pack_id, "bank-overlay");
    }
}
