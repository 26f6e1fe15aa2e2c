//! Packing list against transport document.

use once_cell::sync::Lazy;
use regex::Regex;

use lcx_core::parse::{format_amount, parse_amount};
use lcx_core::{DocumentType, Severity};

use super::{both, Check, CheckContext, RuleSpec};
use crate::document::{keys, SupportingDocument};
use crate::error::RuleFault;

const PAIR: (DocumentType, DocumentType) = (DocumentType::PackingList, DocumentType::BillOfLading);
const BOTH: &[DocumentType] = &[DocumentType::PackingList, DocumentType::BillOfLading];

static WEIGHT_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(KGS?|KGM|KILOS?|KILOGRAMS?|MTS?|TONNES?|TONS?|LBS?|POUNDS?)\b")
        .expect("Invalid weight unit regex")
});

/// Packing list rules.
pub const RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "CROSSDOC-PL-001",
        title: "Gross Weight Mismatch",
        pair: PAIR,
        requires: BOTH,
        check: gross_weight,
    },
    RuleSpec {
        id: "CROSSDOC-PL-002",
        title: "Package Count Mismatch",
        pair: PAIR,
        requires: BOTH,
        check: packages,
    },
];

/// Kilograms per unit. Bare numbers are kilograms.
fn unit_factor(unit: &str) -> f64 {
    match unit.to_uppercase().as_str() {
        "MT" | "MTS" | "TON" | "TONS" | "TONNE" | "TONNES" => 1000.0,
        "LB" | "LBS" | "POUND" | "POUNDS" => 0.453_592,
        _ => 1.0,
    }
}

/// Gross weight in kilograms.
fn weight_kg(doc: &SupportingDocument) -> Option<f64> {
    let raw = doc.get(keys::GROSS_WEIGHT)?;
    match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let value = parse_amount(s)?;
            let factor = WEIGHT_UNIT
                .captures(s)
                .and_then(|c| c.get(1))
                .map_or(1.0, |m| unit_factor(m.as_str()));
            Some(value * factor)
        }
        _ => None,
    }
}

fn gross_weight(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let packed = ctx.doc(DocumentType::PackingList).and_then(weight_kg);
    let shipped = ctx.doc(DocumentType::BillOfLading).and_then(weight_kg);
    let Some((packed, shipped)) = both(packed, shipped) else {
        return Ok(Check::Skip("gross weight not available"));
    };
    let reference = packed.abs().max(shipped.abs());
    if reference == 0.0 || (packed - shipped).abs() / reference <= ctx.config.weight_tolerance {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[0]
            .issue(Severity::Major)
            .message(format!(
                "The packing list shows gross weight {} KG; the transport document shows {} KG.",
                format_amount(packed),
                format_amount(shipped)
            ))
            .expected(format!("{} KG", format_amount(shipped)))
            .actual(format!("{} KG", format_amount(packed)))
            .suggestion("Reconcile the gross weight across the packing list and transport document.")
            .ucp("UCP600 Article 14(d)")
            .build(),
    ))
}

fn package_count(doc: &SupportingDocument) -> Option<u64> {
    match doc.get(keys::PACKAGES)? {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => parse_amount(s).filter(|v| *v >= 0.0).map(|v| v.round() as u64),
        _ => None,
    }
}

fn packages(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let packed = ctx.doc(DocumentType::PackingList).and_then(package_count);
    let shipped = ctx.doc(DocumentType::BillOfLading).and_then(package_count);
    let Some((packed, shipped)) = both(packed, shipped) else {
        return Ok(Check::Skip("package count not available"));
    };
    if packed == shipped {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[1]
            .issue(Severity::Minor)
            .message(format!(
                "The packing list shows {packed} packages; the transport document shows {shipped}."
            ))
            .expected(shipped.to_string())
            .actual(packed.to_string())
            .suggestion("Reconcile the number of packages across the documents.")
            .ucp("UCP600 Article 14(d)")
            .build(),
    ))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::document::SupportingDocuments;

    fn harness(pl: SupportingDocument, bl: SupportingDocument) -> Harness {
        Harness::new(
            SupportingDocuments::none()
                .with(DocumentType::PackingList, pl)
                .with(DocumentType::BillOfLading, bl),
        )
    }

    #[test]
    fn units_are_converted() {
        let h = harness(
            SupportingDocument::new().with("gross_weight", "12,500 KGS"),
            SupportingDocument::new().with("gross_weight", "12.5 MT"),
        );
        assert_eq!(h.run(RULES, "CROSSDOC-PL-001"), Check::Pass);
    }

    #[test]
    fn weight_within_one_percent_passes() {
        let h = harness(
            SupportingDocument::new().with("gross_weight", 10_000),
            SupportingDocument::new().with("gross_weight", "10,080 KG"),
        );
        assert_eq!(h.run(RULES, "CROSSDOC-PL-001"), Check::Pass);
    }

    #[test]
    fn pounds_convert_and_real_differences_are_major() {
        let h = harness(
            SupportingDocument::new().with("gross_weight", "10,000 KGS"),
            SupportingDocument::new().with("gross_weight", "22,046 LBS"),
        );
        assert_eq!(h.run(RULES, "CROSSDOC-PL-001"), Check::Pass);
        let h = harness(
            SupportingDocument::new().with("gross_weight", "10,000 KGS"),
            SupportingDocument::new().with("gross_weight", "10,500 KGS"),
        );
        assert_eq!(failed(h.run(RULES, "CROSSDOC-PL-001")).severity(), Severity::Major);
    }

    #[test]
    fn package_count_mismatch_is_minor() {
        let h = harness(
            SupportingDocument::new().with("packages", "500 CARTONS"),
            SupportingDocument::new().with("number_of_packages", 480),
        );
        let issue = failed(h.run(RULES, "CROSSDOC-PL-002"));
        assert_eq!(issue.severity(), Severity::Minor);
        assert_eq!(issue.expected(), "480");
    }
}
