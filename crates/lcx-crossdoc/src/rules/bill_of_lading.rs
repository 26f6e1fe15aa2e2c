//! Transport document against the credit (UCP 600 Art. 19 and 20).

use once_cell::sync::Lazy;
use regex::Regex;

use lcx_core::{DocumentType, LcField, Severity};

use super::{both, Check, CheckContext, RuleSpec};
use crate::document::{keys, SupportingDocument};
use crate::error::RuleFault;

const PAIR: (DocumentType, DocumentType) = (DocumentType::BillOfLading, DocumentType::LetterOfCredit);
const BL: &[DocumentType] = &[DocumentType::BillOfLading];

/// Notations declaring a defective condition of the goods or packaging.
static ADVERSE_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(DAMAGED|TORN|STAINED|WET|LEAKING|BROKEN|DENTED|RUSTY|CRACKED|CONTAMINATED|CRUSHED|INSUFFICIENT(?:LY)?\s+PACK(?:ED|ING)|SHORT[-\s]SHIPPED|MISSING\s+PACKAGES?)\b",
    )
    .expect("Invalid adverse clause regex")
});

/// Transport document rules.
pub const RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "CROSSDOC-BL-001",
        title: "Port of Loading Mismatch",
        pair: PAIR,
        requires: BL,
        check: port_of_loading,
    },
    RuleSpec {
        id: "CROSSDOC-BL-002",
        title: "Port of Discharge Mismatch",
        pair: PAIR,
        requires: BL,
        check: port_of_discharge,
    },
    RuleSpec {
        id: "CROSSDOC-BL-003",
        title: "Late Shipment",
        pair: PAIR,
        requires: BL,
        check: late_shipment,
    },
    RuleSpec {
        id: "CROSSDOC-BL-004",
        title: "Shipper Not the Beneficiary",
        pair: PAIR,
        requires: BL,
        check: shipper,
    },
    RuleSpec {
        id: "CROSSDOC-BL-005",
        title: "Consignee Inconsistent with LC",
        pair: PAIR,
        requires: BL,
        check: consignee,
    },
    RuleSpec {
        id: "CROSSDOC-BL-006",
        title: "No On-Board Notation",
        pair: PAIR,
        requires: BL,
        check: on_board,
    },
    RuleSpec {
        id: "CROSSDOC-BL-007",
        title: "Claused Transport Document",
        pair: PAIR,
        requires: BL,
        check: adverse_clauses,
    },
    RuleSpec {
        id: "CROSSDOC-BL-008",
        title: "Multimodal Place Mismatch",
        pair: PAIR,
        requires: BL,
        check: multimodal_places,
    },
    RuleSpec {
        id: "CROSSDOC-BL-009",
        title: "Late Dispatch",
        pair: PAIR,
        requires: BL,
        check: multimodal_dispatch,
    },
];

fn bl<'a>(ctx: &CheckContext<'a>) -> Option<&'a SupportingDocument> {
    ctx.doc(DocumentType::BillOfLading)
}

fn port_rule(
    ctx: &CheckContext<'_>,
    spec: &RuleSpec,
    aliases: &[&str],
    field: LcField,
    label: &str,
    article: &str,
) -> Result<Check, RuleFault> {
    let presented = bl(ctx).and_then(|d| d.text(aliases));
    let Some((presented, required)) = both(presented, ctx.lc_text(field)) else {
        return Ok(Check::Skip("port not available"));
    };
    if ctx.ports.match_ports(&presented, required).matched {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        spec.issue(Severity::Critical)
            .message(format!(
                "The transport document shows {label} \"{presented}\"; the credit requires \"{required}\"."
            ))
            .expected(required)
            .actual(presented)
            .suggestion(format!("Present a transport document showing the {label} stated in the credit."))
            .field(field.name())
            .ucp(article)
            .build(),
    ))
}

fn port_of_loading(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    port_rule(
        ctx,
        &RULES[0],
        keys::PORT_OF_LOADING,
        LcField::PortOfLoading,
        "port of loading",
        "UCP600 Article 20(a)(iii)",
    )
}

fn port_of_discharge(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    port_rule(
        ctx,
        &RULES[1],
        keys::PORT_OF_DISCHARGE,
        LcField::PortOfDischarge,
        "port of discharge",
        "UCP600 Article 20(a)(iii)",
    )
}

fn late_shipment(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let shipped = bl(ctx).and_then(|d| d.date(keys::SHIPMENT_DATE));
    let Some((shipped, latest)) = both(shipped, ctx.lc_date(LcField::LatestShipmentDate)) else {
        return Ok(Check::Skip("shipment date not available"));
    };
    if shipped <= latest {
        return Ok(Check::Pass);
    }
    let late = (shipped - latest).num_days();
    Ok(Check::Fail(
        RULES[2]
            .issue(Severity::Critical)
            .message(format!(
                "Goods were shipped on {shipped}, {late} day(s) after the latest shipment date {latest}."
            ))
            .expected(format!("Shipment on or before {latest}"))
            .actual(shipped.to_string())
            .suggestion("Late shipment cannot be corrected; seek an amendment or the applicant's waiver.")
            .field(LcField::LatestShipmentDate.name())
            .ucp("UCP600 Article 20(a)(ii)")
            .isbp("ISBP745 E19")
            .build(),
    ))
}

fn shipper(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let presented = bl(ctx).and_then(|d| d.text(keys::SHIPPER));
    let Some((shipper, beneficiary)) = both(presented, ctx.lc_text(LcField::Beneficiary)) else {
        return Ok(Check::Skip("shipper not available"));
    };
    let result = ctx.party.match_names(&shipper, beneficiary);
    if result.matched {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[3]
            .issue(Severity::Major)
            .message(format!(
                "The shipper \"{shipper}\" does not match the beneficiary \"{beneficiary}\" (confidence {:.2}).",
                result.confidence
            ))
            .expected(beneficiary)
            .actual(shipper)
            .suggestion("Confirm the credit allows a third-party shipper or correct the transport document.")
            .field(LcField::Beneficiary.name())
            .ucp("UCP600 Article 14(k)")
            .build(),
    ))
}

fn is_order_consignment(consignee: &str) -> bool {
    let upper = consignee.to_uppercase();
    upper.contains("TO ORDER") || upper.contains("ORDER OF") || upper.contains("TO THE ORDER")
}

fn consignee(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let presented = bl(ctx).and_then(|d| d.text(keys::CONSIGNEE));
    let Some(consignee) = presented else {
        return Ok(Check::Skip("consignee not available"));
    };
    if is_order_consignment(&consignee) {
        return Ok(Check::Pass);
    }
    let Some(applicant) = ctx.lc_text(LcField::Applicant) else {
        return Ok(Check::Skip("applicant not available"));
    };
    if ctx.party.match_names(&consignee, applicant).matched {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[4]
            .issue(Severity::Minor)
            .message(format!(
                "The consignee \"{consignee}\" is neither to order nor the applicant \"{applicant}\"."
            ))
            .expected(format!("TO ORDER, or {applicant}"))
            .actual(consignee)
            .suggestion("Check the consignee against the credit's transport document requirements.")
            .field(LcField::Applicant.name())
            .isbp("ISBP745 E10")
            .build(),
    ))
}

/// What the document shows about shipment on board. `None` when it states
/// neither a type nor a notation.
fn on_board_evidence(doc: &SupportingDocument) -> Option<bool> {
    // A notation may be a flag or free text such as "SHIPPED ON BOARD 10 MAR 2026".
    if let Some(flag) = doc.flag(keys::ON_BOARD) {
        return Some(flag);
    }
    if doc.text(keys::ON_BOARD).is_some() || doc.date(keys::ON_BOARD_DATE).is_some() {
        return Some(true);
    }
    let kind = doc.text(keys::BL_TYPE)?.to_uppercase();
    Some(kind.contains("ON BOARD") || kind.contains("SHIPPED"))
}

fn on_board(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let Some(doc) = bl(ctx) else {
        return Ok(Check::Skip("transport document not presented"));
    };
    match on_board_evidence(doc) {
        None => Ok(Check::Skip("no on-board evidence")),
        Some(true) => Ok(Check::Pass),
        Some(false) => {
            let shown = doc.text(keys::BL_TYPE).unwrap_or_else(|| "not shipped on board".into());
            Ok(Check::Fail(
                RULES[5]
                    .issue(Severity::Critical)
                    .message("The transport document does not evidence shipment on board a named vessel.")
                    .expected("Shipped on board notation with date")
                    .actual(shown)
                    .suggestion("Obtain a dated on-board notation from the carrier.")
                    .ucp("UCP600 Article 20(a)(ii)")
                    .isbp("ISBP745 E6")
                    .build(),
            ))
        }
    }
}

fn adverse_clauses(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let Some(doc) = bl(ctx) else {
        return Ok(Check::Skip("transport document not presented"));
    };
    let Some(raw) = doc.get(keys::CLAUSES) else {
        return Ok(Check::Skip("no clauses recorded"));
    };
    if raw.is_object() {
        return Err(RuleFault::UnexpectedInput {
            field: "bill_of_lading.clauses".into(),
            message: "expected text or a list of texts".into(),
        });
    }
    let adverse: Vec<String> = doc
        .texts(keys::CLAUSES)
        .into_iter()
        .filter(|c| ADVERSE_CLAUSE.is_match(c))
        .collect();
    if adverse.is_empty() {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[6]
            .issue(Severity::Critical)
            .message(format!(
                "The transport document bears clauses declaring a defective condition: {}.",
                adverse.join("; ")
            ))
            .expected("Clean transport document")
            .actual(adverse.join("; "))
            .suggestion("Only a clean transport document is acceptable; obtain a clean replacement.")
            .ucp("UCP600 Article 27")
            .isbp("ISBP745 E21")
            .build(),
    ))
}

fn mentions_multimodal(text: &str) -> bool {
    let upper = text.to_uppercase();
    upper.contains("MULTIMODAL") || upper.contains("MULTI-MODAL") || upper.contains("COMBINED")
}

fn is_multimodal(ctx: &CheckContext<'_>) -> bool {
    let doc = bl(ctx);
    doc.and_then(|d| d.text(keys::TRANSPORT_MODE)).is_some_and(|t| mentions_multimodal(&t))
        || doc.and_then(|d| d.text(keys::BL_TYPE)).is_some_and(|t| mentions_multimodal(&t))
        || ctx.lc_term("transport_mode").is_some_and(mentions_multimodal)
}

fn multimodal_places(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    if !is_multimodal(ctx) {
        return Ok(Check::Skip("not a multimodal transport"));
    }
    let Some(doc) = bl(ctx) else {
        return Ok(Check::Skip("transport document not presented"));
    };
    let pairs = [
        ("place of receipt", keys::PLACE_OF_RECEIPT),
        ("place of delivery", keys::PLACE_OF_DELIVERY),
    ];
    let mut compared = false;
    let mut mismatches = Vec::new();
    for (label, aliases) in pairs {
        let required = aliases.iter().find_map(|k| ctx.lc_term(k));
        let Some((presented, required)) = both(doc.text(aliases), required) else {
            continue;
        };
        compared = true;
        if !ctx.ports.match_ports(&presented, required).matched {
            mismatches.push((label, presented, required.to_string()));
        }
    }
    if !compared {
        return Ok(Check::Skip("places not available"));
    }
    if mismatches.is_empty() {
        return Ok(Check::Pass);
    }
    let shown: Vec<String> = mismatches
        .iter()
        .map(|(label, p, r)| format!("{label} \"{p}\" instead of \"{r}\""))
        .collect();
    let expected: Vec<String> = mismatches.iter().map(|(label, _, r)| format!("{label}: {r}")).collect();
    let actual: Vec<String> = mismatches.iter().map(|(label, p, _)| format!("{label}: {p}")).collect();
    Ok(Check::Fail(
        RULES[7]
            .issue(Severity::Critical)
            .message(format!("The multimodal transport document shows {}.", shown.join("; ")))
            .expected(expected.join("; "))
            .actual(actual.join("; "))
            .suggestion("Show the places of taking in charge and final destination stated in the credit.")
            .ucp("UCP600 Article 19(a)(iii)")
            .build(),
    ))
}

fn multimodal_dispatch(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    if !is_multimodal(ctx) {
        return Ok(Check::Skip("not a multimodal transport"));
    }
    let dispatched = bl(ctx).and_then(|d| d.date(keys::DISPATCH_DATE));
    let Some((dispatched, latest)) = both(dispatched, ctx.lc_date(LcField::LatestShipmentDate)) else {
        return Ok(Check::Skip("dispatch date not available"));
    };
    if dispatched <= latest {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[8]
            .issue(Severity::Critical)
            .message(format!(
                "Goods were taken in charge on {dispatched}, after the latest shipment date {latest}."
            ))
            .expected(format!("Dispatch on or before {latest}"))
            .actual(dispatched.to_string())
            .suggestion("Seek an amendment or the applicant's waiver for late dispatch.")
            .field(LcField::LatestShipmentDate.name())
            .ucp("UCP600 Article 19(a)(ii)")
            .build(),
    ))
}
