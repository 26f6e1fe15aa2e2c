//! # Validate Subcommand
//!
//! Runs one examination over a baseline file and an optional presentation
//! file and prints the result.
//!
//! The baseline file holds either a serialized baseline or an extraction
//! payload (`{"fields": {"lc_number": {"value": "...", "confidence": 0.9}}}`).
//! The presentation file is an object keyed by document type
//! (`invoice`, `bill_of_lading`, `insurance`, `certificate_of_origin`,
//! `packing_list`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use lcx_core::{Clock, FixedClock, LcBaseline, SystemClock};
use lcx_crossdoc::SupportingDocuments;
use lcx_pipeline::{PipelineConfig, PipelineRun, ValidationPipeline, ValidationStatus};

use crate::read_json;

/// Arguments for the `lcx validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// LC baseline JSON file.
    #[arg(long, value_name = "PATH")]
    pub baseline: PathBuf,

    /// Supporting documents JSON file.
    #[arg(long, value_name = "PATH")]
    pub documents: Option<PathBuf>,

    /// Examination date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Print the full result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Include the audit trail in JSON output.
    #[arg(long, requires = "json")]
    pub trail: bool,
}

/// Resolve configuration: an explicit file, else `LCX_CONFIG`, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => PipelineConfig::load().context("failed to load configuration from LCX_CONFIG"),
    }
}

/// Build a pipeline and examine the given files.
pub fn examine(args: &ValidateArgs, config: PipelineConfig) -> Result<PipelineRun> {
    let baseline: LcBaseline = read_json(&args.baseline)?;
    let documents: SupportingDocuments = match &args.documents {
        Some(path) => read_json(path)?,
        None => SupportingDocuments::none(),
    };
    let clock: Arc<dyn Clock> = match args.today {
        Some(date) => Arc::new(FixedClock::on(date)),
        None => Arc::new(SystemClock),
    };
    let pipeline = ValidationPipeline::builder(config)
        .clock(clock)
        .build()
        .context("failed to build validation pipeline")?;
    pipeline.run(&baseline, &documents).context("validation run failed")
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when PASSED or WARNING, 1 when FAILED or BLOCKED.
pub fn run_validate(args: &ValidateArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = load_config(config_path)?;
    let run = examine(args, config)?;

    if args.json {
        let text = if args.trail {
            serde_json::to_string_pretty(&run)?
        } else {
            serde_json::to_string_pretty(&run.output)?
        };
        println!("{text}");
    } else {
        print_report(&run);
    }

    Ok(exit_code(run.output.status))
}

/// Exit code for a status.
pub fn exit_code(status: ValidationStatus) -> u8 {
    match status {
        ValidationStatus::Passed | ValidationStatus::Warning => 0,
        ValidationStatus::Failed | ValidationStatus::Blocked => 1,
    }
}

fn print_report(run: &PipelineRun) {
    let out = &run.output;
    println!(
        "LC {}: {} (score {:.1}, {})",
        out.lc_baseline.value(lcx_core::LcField::LcNumber).unwrap_or("(unknown)"),
        out.status,
        out.compliance_score,
        out.compliance_level
    );
    if let Some(reason) = &out.score_breakdown.cap_reason {
        println!("  {reason}");
    }
    println!(
        "  cross-document rules: {} executed, {} passed, {} skipped",
        out.crossdoc_result.rules_executed, out.crossdoc_result.rules_passed, out.crossdoc_result.rules_skipped
    );
    if !out.missing_critical_fields.is_empty() {
        println!("  missing critical fields: {}", out.missing_critical_fields.join(", "));
    }
    for issue in &out.issues {
        println!("  [{}] {} {}", issue.severity(), issue.rule(), issue.title());
        if !issue.message().is_empty() {
            println!("      {}", issue.message());
        }
    }
    println!("  audit trail {}", out.audit_trail_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    fn args(baseline: &Path, documents: Option<&Path>) -> ValidateArgs {
        ValidateArgs {
            baseline: baseline.to_path_buf(),
            documents: documents.map(Path::to_path_buf),
            today: NaiveDate::from_ymd_opt(2026, 3, 1),
            json: true,
            trail: false,
        }
    }

    #[test]
    fn blocked_payload_exits_one() {
        let baseline = write(r#"{"fields": {"currency": {"value": "USD", "confidence": 0.9}}}"#);
        let run = examine(&args(baseline.path(), None), PipelineConfig::default()).expect("run");
        assert_eq!(run.output.status, ValidationStatus::Blocked);
        assert_eq!(exit_code(run.output.status), 1);
    }

    #[test]
    fn presentation_file_is_read() {
        let baseline = write(
            r#"{"fields": {
                "lc_number": {"value": "LC-1", "confidence": 0.95},
                "amount": {"value": "USD 100,000.00", "confidence": 0.95},
                "currency": {"value": "USD", "confidence": 0.95},
                "expiry_date": {"value": "2026-04-30", "confidence": 0.95},
                "applicant": {"value": "Nordsee Textilhandel GmbH", "confidence": 0.9},
                "beneficiary": {"value": "Dhaka Knitwear Mfg. Co. Ltd.", "confidence": 0.9}
            }}"#,
        );
        let documents = write(r#"{"invoice": {"invoice_amount": "USD 106,000.00"}}"#);
        let run = examine(&args(baseline.path(), Some(documents.path())), PipelineConfig::default()).expect("run");
        assert!(run.output.issues.iter().any(|i| i.rule() == "CROSSDOC-INV-001"));
        assert_eq!(exit_code(run.output.status), 1);
    }

    #[test]
    fn unreadable_baseline_is_an_error() {
        let missing = Path::new("/nonexistent/baseline.json");
        assert!(examine(&args(missing, None), PipelineConfig::default()).is_err());
    }

    #[test]
    fn explicit_config_file_is_used() {
        let config = write("scoring:\n  critical_cap: 10\n");
        let loaded = load_config(Some(config.path())).expect("config");
        assert_eq!(loaded.scoring.critical_cap, 10.0);
    }
}
