//! Certificate of origin against the credit.

use lcx_core::{DocumentType, LcField, Severity};

use super::{both, compact, Check, CheckContext, RuleSpec};
use crate::document::keys;
use crate::error::RuleFault;

const PAIR: (DocumentType, DocumentType) = (DocumentType::CertificateOfOrigin, DocumentType::LetterOfCredit);
const COO: &[DocumentType] = &[DocumentType::CertificateOfOrigin];

/// Certificate of origin rules.
pub const RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "CROSSDOC-COO-001",
        title: "Certificate of Origin Goods Mismatch",
        pair: PAIR,
        requires: COO,
        check: goods,
    },
    RuleSpec {
        id: "CROSSDOC-COO-002",
        title: "Country of Origin Mismatch",
        pair: PAIR,
        requires: COO,
        check: country,
    },
];

fn goods(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let presented = ctx
        .doc(DocumentType::CertificateOfOrigin)
        .and_then(|d| d.text(keys::GOODS));
    let Some((presented, reference)) = both(presented, ctx.lc_text(LcField::GoodsDescription)) else {
        return Ok(Check::Skip("goods description not available"));
    };
    // Certificates commonly describe goods in general terms.
    let result = ctx.goods.compare(reference, &presented);
    if result.corresponds {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[0]
            .issue(Severity::Major)
            .message(format!(
                "The certificate of origin describes goods that conflict with the credit (similarity {:.2}).",
                result.confidence
            ))
            .expected(reference)
            .actual(presented)
            .suggestion("Align the certificate's goods description with the credit.")
            .field(LcField::GoodsDescription.name())
            .ucp("UCP600 Article 14(e)")
            .isbp("ISBP745 L3")
            .build(),
    ))
}

/// "BANGLADESH" agrees with "MADE IN BANGLADESH" and "PEOPLE'S REPUBLIC OF
/// BANGLADESH".
fn same_country(a: &str, b: &str) -> bool {
    let (a, b) = (compact(a), compact(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    short == long || (short.len() >= 4 && long.contains(short.as_str()))
}

fn country(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let presented = ctx
        .doc(DocumentType::CertificateOfOrigin)
        .and_then(|d| d.text(keys::ORIGIN));
    let required = keys::ORIGIN.iter().find_map(|k| ctx.lc_term(k));
    let Some((presented, required)) = both(presented, required) else {
        return Ok(Check::Skip("origin not available"));
    };
    if same_country(&presented, required) {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[1]
            .issue(Severity::Major)
            .message(format!(
                "The certificate states origin \"{presented}\"; the credit requires goods of \"{required}\" origin."
            ))
            .expected(required)
            .actual(presented)
            .suggestion("Present a certificate evidencing the origin required by the credit.")
            .isbp("ISBP745 L6")
            .build(),
    ))
}
