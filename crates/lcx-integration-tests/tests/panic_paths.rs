//! # Adversarial Presentation Data
//!
//! Extracted documents are untrusted. Malformed values must end as skipped
//! checks, issues or contained faults; a run never panics or errors on
//! presentation data.

mod common;

use serde_json::json;

use common::*;
use lcx_core::{IssueSource, LcBaseline, LcField, Severity};
use lcx_crossdoc::{ExecutionStatus, SupportingDocument, SupportingDocuments};
use lcx_pipeline::{AuditEventType, ValidationStatus};

fn run_with_invoice(invoice: SupportingDocument) -> lcx_pipeline::PipelineRun {
    let documents = SupportingDocuments {
        invoice: Some(invoice),
        ..clean_documents()
    };
    pipeline().run(&clean_baseline(), &documents).expect("run")
}

// =========================================================================
// Contained rule faults
// =========================================================================

#[test]
fn object_valued_clauses_fault_one_rule_only() {
    let mut documents = clean_documents();
    documents.bill_of_lading = Some(bill_of_lading().with("clauses", json!({"remark": "DAMAGED"})));
    let run = pipeline().run(&clean_baseline(), &documents).expect("run");
    let crossdoc = &run.output.crossdoc_result;

    assert_eq!(crossdoc.rules_faulted, 1);
    let faulted = crossdoc
        .executions
        .iter()
        .find(|e| e.status == ExecutionStatus::Faulted)
        .expect("faulted execution");
    assert_eq!(faulted.rule_id, "CROSSDOC-BL-007");

    let issue = run
        .output
        .issues
        .iter()
        .find(|i| i.rule() == "CROSSDOC-BL-007")
        .expect("fault reported");
    assert_eq!(issue.title(), "Rule Execution Fault");
    assert_eq!(issue.severity(), Severity::Minor);
    assert_eq!(issue.source(), IssueSource::Crossdoc);

    // The remaining transport checks still ran.
    let shipment = crossdoc
        .executions
        .iter()
        .find(|e| e.rule_id == "CROSSDOC-BL-003")
        .expect("recorded");
    assert_eq!(shipment.status, ExecutionStatus::Passed);
    assert_eq!(run.output.status, ValidationStatus::Warning);

    let faults: Vec<_> = run
        .trail
        .events_by_type(AuditEventType::CrossdocCheck)
        .into_iter()
        .filter(|e| e.decision.as_deref() == Some("faulted"))
        .collect();
    assert_eq!(faults.len(), 1);
}

// =========================================================================
// Malformed values
// =========================================================================

#[test]
fn structured_values_where_text_is_expected() {
    let run = run_with_invoice(
        invoice()
            .with("invoice_amount", json!({"value": 98500}))
            .with("seller", json!(["a", "b"]))
            .with("invoice_date", json!(true)),
    );
    let executions = &run.output.crossdoc_result.executions;
    for id in ["CROSSDOC-INV-001", "CROSSDOC-INV-004"] {
        let execution = executions.iter().find(|e| e.rule_id == id).expect("recorded");
        assert_eq!(execution.status, ExecutionStatus::Skipped, "{id}");
    }
}

#[test]
fn numeric_amount_is_accepted() {
    let run = run_with_invoice(invoice().with("invoice_amount", 98_500.0));
    let execution = run
        .output
        .crossdoc_result
        .executions
        .iter()
        .find(|e| e.rule_id == "CROSSDOC-INV-001")
        .expect("recorded");
    assert_eq!(execution.status, ExecutionStatus::Passed);
}

#[test]
fn impossible_dates_are_skipped() {
    let mut documents = clean_documents();
    documents.bill_of_lading = Some(bill_of_lading().with("shipment_date", "31/02/2026"));
    let run = pipeline().run(&clean_baseline(), &documents).expect("run");
    let execution = run
        .output
        .crossdoc_result
        .executions
        .iter()
        .find(|e| e.rule_id == "CROSSDOC-BL-003")
        .expect("recorded");
    // The issue-date alias is absent too, so nothing dates the shipment.
    assert_eq!(execution.status, ExecutionStatus::Skipped);
}

#[test]
fn very_long_and_unicode_names_complete() {
    let long = "Ä".repeat(10_000);
    let run = run_with_invoice(
        invoice()
            .with("seller", long.as_str())
            .with("buyer", "株式会社 日本商事 🏛️")
            .with("goods_description", "\u{0}\u{7}\u{200b}"),
    );
    assert!((0.0..=100.0).contains(&run.output.compliance_score));
}

#[test]
fn empty_documents_count_as_presented() {
    let documents = SupportingDocuments::none().with(lcx_core::DocumentType::Invoice, SupportingDocument::new());
    let run = pipeline().run(&clean_baseline(), &documents).expect("run");
    let crossdoc = &run.output.crossdoc_result;
    // The credit-only validity rules run; every invoice rule lacks data.
    assert!(crossdoc.rules_executed > 0);
    assert!(crossdoc
        .executions
        .iter()
        .filter(|e| e.rule_id.starts_with("CROSSDOC-INV-"))
        .all(|e| e.status == ExecutionStatus::Skipped));
}

// =========================================================================
// Malformed credit terms
// =========================================================================

#[test]
fn unparseable_expiry_is_reported_not_fatal() {
    let baseline = LcBaseline::builder()
        .extracted(LcField::LcNumber, LC_NUMBER, 0.97)
        .extracted(LcField::Amount, "USD 100,000.00", 0.96)
        .extracted(LcField::Currency, "USD", 0.98)
        .extracted(LcField::ExpiryDate, "end of April", 0.95)
        .extracted(LcField::Applicant, APPLICANT, 0.93)
        .extracted(LcField::Beneficiary, BENEFICIARY, 0.93)
        .build();
    let run = pipeline().run(&baseline, &clean_documents()).expect("run");
    let issue = run
        .output
        .issues
        .iter()
        .find(|i| i.rule() == "CROSSDOC-LC-003")
        .expect("LC-003 raised");
    assert_eq!(issue.severity(), Severity::Major);
    let expired = run
        .output
        .crossdoc_result
        .executions
        .iter()
        .find(|e| e.rule_id == "CROSSDOC-LC-001")
        .expect("recorded");
    assert_eq!(expired.status, ExecutionStatus::Skipped);
}

#[test]
fn zero_credit_amount_is_critical() {
    let baseline = LcBaseline::builder()
        .extracted(LcField::LcNumber, LC_NUMBER, 0.97)
        .extracted(LcField::Amount, "USD 0.00", 0.96)
        .extracted(LcField::Currency, "USD", 0.98)
        .extracted(LcField::ExpiryDate, "2026-04-30", 0.95)
        .extracted(LcField::Applicant, APPLICANT, 0.93)
        .extracted(LcField::Beneficiary, BENEFICIARY, 0.93)
        .build();
    let run = pipeline().run(&baseline, &SupportingDocuments::none()).expect("run");
    let issue = run
        .output
        .issues
        .iter()
        .find(|i| i.rule() == "UCP600-ART18-AMOUNT-POSITIVE")
        .expect("amount rule fired");
    assert_eq!(issue.severity(), Severity::Critical);
    assert_eq!(issue.source(), IssueSource::Extraction);
    assert_eq!(run.output.status, ValidationStatus::Failed);
}

#[test]
fn nan_confidence_is_treated_as_low() {
    let baseline = LcBaseline::builder()
        .extracted(LcField::LcNumber, LC_NUMBER, f64::NAN)
        .extracted(LcField::Amount, "USD 100,000.00", 0.96)
        .extracted(LcField::Currency, "USD", 0.98)
        .extracted(LcField::ExpiryDate, "2026-04-30", 0.95)
        .extracted(LcField::Applicant, APPLICANT, 0.93)
        .extracted(LcField::Beneficiary, BENEFICIARY, 0.93)
        .build();
    let run = pipeline().run(&baseline, &SupportingDocuments::none()).expect("run");
    assert!((0.0..=100.0).contains(&run.output.compliance_score));
    assert!(run
        .output
        .issues
        .iter()
        .any(|i| i.rule() == "EXTRACT-LC_NUMBER-LOWCONF" && i.severity() == Severity::Critical));
}
