//! Invoice against transport document.

use lcx_core::{DocumentType, Severity};

use super::{both, Check, CheckContext, RuleSpec};
use crate::document::keys;
use crate::error::RuleFault;

/// Invoice / transport document rules.
pub const RULES: &[RuleSpec] = &[RuleSpec {
    id: "CROSSDOC-INVBL-001",
    title: "Goods Description Inconsistent Between Invoice and B/L",
    pair: (DocumentType::Invoice, DocumentType::BillOfLading),
    requires: &[DocumentType::Invoice, DocumentType::BillOfLading],
    check: goods,
}];

// The transport document may describe goods in general terms, so the
// comparison takes the better direction.
fn goods(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let invoice = ctx.doc(DocumentType::Invoice).and_then(|d| d.text(keys::GOODS));
    let bill = ctx.doc(DocumentType::BillOfLading).and_then(|d| d.text(keys::GOODS));
    let Some((invoice, bill)) = both(invoice, bill) else {
        return Ok(Check::Skip("goods description not available"));
    };
    let result = ctx.goods.compare(&invoice, &bill);
    if result.corresponds {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[0]
            .issue(Severity::Major)
            .message(format!(
                "The goods on the transport document conflict with the invoice (similarity {:.2}).",
                result.confidence
            ))
            .expected(invoice)
            .actual(bill)
            .suggestion("Align the transport document description with the invoice.")
            .ucp("UCP600 Article 14(d)")
            .isbp("ISBP745 E20")
            .build(),
    ))
}
