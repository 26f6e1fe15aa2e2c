//! Shared fixtures: a clean CIF credit for knitwear shipped Chittagong to
//! Hamburg, and a presentation that complies with it on 2026-03-01.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use lcx_core::{FixedClock, LcBaseline, LcField};
use lcx_crossdoc::{SupportingDocument, SupportingDocuments};
use lcx_pipeline::{PipelineConfig, ValidationPipeline};

pub const APPLICANT: &str = "Nordsee Textilhandel GmbH";
pub const BENEFICIARY: &str = "Dhaka Knitwear Manufacturing Co. Ltd.";
pub const GOODS: &str = "100% cotton knitted T-shirts, HS 6109.10";
pub const LC_NUMBER: &str = "LC-2026-00417";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn today() -> NaiveDate {
    date(2026, 3, 1)
}

/// Every field extracted with high confidence.
pub fn clean_baseline() -> LcBaseline {
    LcBaseline::builder()
        .extracted(LcField::LcNumber, LC_NUMBER, 0.97)
        .extracted(LcField::Amount, "USD 100,000.00", 0.96)
        .extracted(LcField::Currency, "USD", 0.98)
        .extracted(LcField::ExpiryDate, "2026-04-30", 0.95)
        .extracted(LcField::Applicant, APPLICANT, 0.93)
        .extracted(LcField::Beneficiary, BENEFICIARY, 0.93)
        .extracted(LcField::LatestShipmentDate, "2026-03-15", 0.94)
        .extracted(LcField::PortOfLoading, "Chittagong, Bangladesh", 0.92)
        .extracted(LcField::PortOfDischarge, "Hamburg, Germany", 0.92)
        .extracted(LcField::GoodsDescription, GOODS, 0.9)
        .extracted(LcField::IssuingBank, "Deutsche Handelsbank AG", 0.9)
        .extracted(LcField::IssueDate, "2026-01-10", 0.95)
        .extracted(LcField::Incoterm, "CIF", 0.95)
        .extracted(LcField::AdvisingBank, "Eastern Commerce Bank Ltd", 0.9)
        .extracted(LcField::PresentationPeriod, "21 DAYS", 0.9)
        .build()
}

/// The clean baseline without the given fields.
pub fn baseline_without(fields: &[LcField]) -> LcBaseline {
    let clean = clean_baseline();
    let mut builder = LcBaseline::builder();
    for (field, result) in clean.fields() {
        if fields.contains(&field) {
            continue;
        }
        if let Some(value) = result.value() {
            builder = builder.extracted(field, value, result.confidence());
        }
    }
    builder.build()
}

pub fn invoice() -> SupportingDocument {
    SupportingDocument::new()
        .with("invoice_number", "DKM-INV-2026-118")
        .with("invoice_date", "2026-02-19")
        .with("seller", BENEFICIARY)
        .with("buyer", APPLICANT)
        .with("lc_number", LC_NUMBER)
        .with("invoice_amount", "USD 98,500.00")
        .with("currency", "USD")
        .with("goods_description", GOODS)
}

pub fn bill_of_lading() -> SupportingDocument {
    SupportingDocument::new()
        .with("bl_number", "MSKU-CGP-77120")
        .with("carrier", "Bengal Ocean Lines")
        .with("bl_type", "SHIPPED ON BOARD")
        .with("shipper", BENEFICIARY)
        .with("consignee", "TO ORDER OF DEUTSCHE HANDELSBANK AG")
        .with("port_of_loading", "Chittagong, Bangladesh")
        .with("port_of_discharge", "Hamburg, Germany")
        .with("shipment_date", "2026-02-20")
        .with("freight", "FREIGHT PREPAID")
        .with("goods_description", GOODS)
        .with("clauses", json!(["CLEAN ON BOARD"]))
        .with("gross_weight", 12_400)
        .with("packages", 620)
}

pub fn insurance() -> SupportingDocument {
    SupportingDocument::new()
        .with("policy_number", "MAR-2026-5531")
        .with("insured_amount", "USD 110,000.00")
        .with("currency", "USD")
        .with("issue_date", "2026-02-18")
}

pub fn packing_list() -> SupportingDocument {
    SupportingDocument::new()
        .with("gross_weight", 12_400)
        .with("packages", 620)
        .with("goods_description", GOODS)
}

pub fn certificate_of_origin() -> SupportingDocument {
    SupportingDocument::new()
        .with("country_of_origin", "Bangladesh")
        .with("goods_description", GOODS)
}

pub fn clean_documents() -> SupportingDocuments {
    SupportingDocuments {
        invoice: Some(invoice()),
        bill_of_lading: Some(bill_of_lading()),
        insurance: Some(insurance()),
        certificate_of_origin: Some(certificate_of_origin()),
        packing_list: Some(packing_list()),
    }
}

/// Default pipeline examining on 2026-03-01.
pub fn pipeline() -> ValidationPipeline {
    pipeline_with(PipelineConfig::default())
}

pub fn pipeline_with(config: PipelineConfig) -> ValidationPipeline {
    ValidationPipeline::builder(config)
        .clock(Arc::new(FixedClock::on(today())))
        .build()
        .expect("pipeline builds")
}
