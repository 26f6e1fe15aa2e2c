//! # Configuration and Rule Pack Layering
//!
//! YAML configuration files and bank overlay packs, loaded from disk the
//! way a deployment would load them.

mod common;

use std::io::Write;
use std::path::Path;

use common::*;
use lcx_core::{IssueSource, Severity};
use lcx_pipeline::{
    ConfigError, PipelineConfig, PipelineError, ValidationPipeline, ValidationStatus, CONFIG_ENV,
};
use lcx_rules::{PackTier, RuleDomain, RulePack};

const BANK_OVERLAY: &str = r#"
pack_id: bank-overlay
version: "2026.2"
tier: bank
description: House rules of the nominated bank.
rules:
  - id: BANK-001-INVOICE-SIGNED
    title: Invoice Not Signed
    domain: bank
    severity: minor
    applies_when: "exists(invoice)"
    check:
      expression: "invoice.signed == true"
    message: The nominated bank requires signed commercial invoices.
    expected: Signed invoice
    suggestion: Obtain a signed invoice from the beneficiary.
    documents: [invoice]
"#;

fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("create");
    file.write_all(contents.as_bytes()).expect("write");
    path
}

fn config_with_overlay(dir: &Path) -> PipelineConfig {
    let pack = write_file(dir, "bank-overlay.yaml", BANK_OVERLAY);
    let yaml = format!("rules:\n  pack_paths:\n    - {}\n", pack.display());
    let config_path = write_file(dir, "lcx.yaml", &yaml);
    PipelineConfig::from_path(&config_path).expect("config loads")
}

// =========================================================================
// Overlay packs
// =========================================================================

#[test]
fn overlay_pack_from_config_adds_bank_rules() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = pipeline_with(config_with_overlay(dir.path()));
    let engine = pipeline.rules().expect("rules enabled");
    let overlay = engine
        .rules()
        .find(|r| r.definition().id == "BANK-001-INVOICE-SIGNED")
        .expect("overlay rule loaded");
    assert_eq!(overlay.pack_id(), "bank-overlay");
    assert_eq!(overlay.tier(), PackTier::Bank);

    let mut documents = clean_documents();
    documents.invoice = Some(invoice().with("signed", false));
    let run = pipeline.run(&clean_baseline(), &documents).expect("run");

    let issue = run
        .output
        .issues
        .iter()
        .find(|i| i.rule() == "BANK-001-INVOICE-SIGNED")
        .expect("bank rule fired");
    assert_eq!(issue.severity(), Severity::Minor);
    assert_eq!(issue.source(), IssueSource::Rule);
    assert_eq!(run.output.status, ValidationStatus::Warning);
    assert_eq!(run.output.compliance_score, 85.0);
    assert!(run.output.score_breakdown.capped);
}

#[test]
fn overlay_rule_without_its_input_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pipeline = pipeline_with(config_with_overlay(dir.path()));
    // No "signed" key: the comparison is unknown, not false.
    let run = pipeline.run(&clean_baseline(), &clean_documents()).expect("run");
    assert!(run.output.issues.is_empty());
    assert_eq!(run.output.status, ValidationStatus::Passed);
}

#[test]
fn bank_tier_overrides_builtin_definition() {
    let overlay = RulePack::from_yaml_str(
        r#"
pack_id: strict-bank
version: "1"
tier: bank
rules:
  - id: UCP600-ART14C-PRESENTATION-PERIOD
    title: Presentation Period Exceeds 10 Days
    domain: bank
    severity: major
    check:
      expression: "amount(lc.presentation_period) <= 10"
    message: The bank accepts at most 10 days for presentation.
"#,
    )
    .expect("pack parses");
    let pipeline = ValidationPipeline::builder(PipelineConfig::default())
        .clock(std::sync::Arc::new(lcx_core::FixedClock::on(today())))
        .pack(overlay)
        .build()
        .expect("pipeline builds");

    let engine = pipeline.rules().expect("rules enabled");
    let effective: Vec<_> = engine
        .rules()
        .filter(|r| r.definition().id == "UCP600-ART14C-PRESENTATION-PERIOD")
        .collect();
    assert_eq!(effective.len(), 1);
    assert_eq!(effective[0].pack_id(), "strict-bank");

    let run = pipeline.run(&clean_baseline(), &clean_documents()).expect("run");
    let issue = run
        .output
        .issues
        .iter()
        .find(|i| i.rule() == "UCP600-ART14C-PRESENTATION-PERIOD")
        .expect("stricter rule fired");
    assert_eq!(issue.severity(), Severity::Major);
    assert_eq!(issue.title(), "Presentation Period Exceeds 10 Days");
}

#[test]
fn broken_overlay_fails_construction() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pack = write_file(
        dir.path(),
        "broken.yaml",
        &BANK_OVERLAY.replace("invoice.signed == true", "invoice.signed =="),
    );
    let mut config = PipelineConfig::default();
    config.rules.pack_paths.push(pack);
    let err = ValidationPipeline::new(config).expect_err("broken pack rejected");
    assert!(matches!(err, PipelineError::Rules(_)), "got {err:?}");
}

// =========================================================================
// Configuration
// =========================================================================

#[test]
fn category_filter_limits_rule_domains() {
    let config = PipelineConfig::from_yaml_str("rules:\n  categories: [isbp745]\n").expect("config");
    let pipeline = pipeline_with(config);
    let run = pipeline.run(&clean_baseline(), &clean_documents()).expect("run");
    assert!(!run.output.rule_report.outcomes.is_empty());
    assert!(run
        .output
        .rule_report
        .outcomes
        .iter()
        .all(|o| o.domain == RuleDomain::Isbp745));
}

#[test]
fn tighter_insurance_ratio_from_yaml_changes_the_verdict() {
    let config = PipelineConfig::from_yaml_str("crossdoc:\n  insurance_coverage_ratio: 1.2\n").expect("config");
    let run = pipeline_with(config)
        .run(&clean_baseline(), &clean_documents())
        .expect("run");
    let issue = run
        .output
        .issues
        .iter()
        .find(|i| i.rule() == "CROSSDOC-INS-001")
        .expect("under-insured at 120%");
    assert!(issue.message().contains("(120% of LC amount)"));
}

#[test]
fn out_of_range_threshold_is_rejected_with_its_section() {
    let err = PipelineConfig::from_yaml_str("gate:\n  min_completeness: 1.5\n").expect_err("rejected");
    match err {
        ConfigError::Invalid { section, .. } => assert_eq!(section, "gate"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn config_round_trips_through_yaml_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = PipelineConfig::default();
    config.scoring.critical_cap = 20.0;
    config.crossdoc.presentation_period_days = 15;
    let path = write_file(dir.path(), "lcx.yaml", &config.to_yaml().expect("yaml"));
    let loaded = PipelineConfig::from_path(&path).expect("loads");
    assert_eq!(loaded, config);
}

#[test]
fn config_file_is_found_through_the_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_file(dir.path(), "lcx.yaml", "scoring:\n  major_cap: 50\n");
    std::env::set_var(CONFIG_ENV, &path);
    let loaded = PipelineConfig::load();
    std::env::remove_var(CONFIG_ENV);
    assert_eq!(loaded.expect("loads").scoring.major_cap, 50.0);
}
