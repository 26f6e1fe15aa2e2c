//! Insurance document (UCP 600 Art. 28).

use lcx_core::parse::parse_currency;
use lcx_core::{DocumentType, LcField, Severity};

use super::{both, money, Check, CheckContext, RuleSpec};
use crate::document::keys;
use crate::error::RuleFault;

const PAIR: (DocumentType, DocumentType) = (DocumentType::Insurance, DocumentType::LetterOfCredit);

/// Insurance rules.
pub const RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "CROSSDOC-INS-001",
        title: "Insufficient Insurance Coverage",
        pair: PAIR,
        requires: &[DocumentType::Insurance],
        check: coverage,
    },
    RuleSpec {
        id: "CROSSDOC-INS-002",
        title: "Insurance Dated After Shipment",
        pair: (DocumentType::Insurance, DocumentType::BillOfLading),
        requires: &[DocumentType::Insurance, DocumentType::BillOfLading],
        check: effective_date,
    },
    RuleSpec {
        id: "CROSSDOC-INS-003",
        title: "Insurance Currency Differs from LC",
        pair: PAIR,
        requires: &[DocumentType::Insurance],
        check: currency,
    },
];

fn coverage(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let insured = ctx
        .doc(DocumentType::Insurance)
        .and_then(|d| d.amount(keys::INSURED_AMOUNT));
    let Some((insured, lc_amount)) = both(insured, ctx.lc_amount()) else {
        return Ok(Check::Skip("insured amount not available"));
    };
    let ratio = ctx.config.insurance_coverage_ratio;
    let required = lc_amount * ratio;
    if insured + ctx.config.amount_epsilon >= required {
        return Ok(Check::Pass);
    }
    let currency = ctx.lc_currency();
    let currency = currency.as_deref();
    let pct = ratio * 100.0;
    Ok(Check::Fail(
        RULES[0]
            .issue(Severity::Critical)
            .message(format!(
                "Insurance coverage {} is below required {} ({pct:.0}% of LC amount); shortfall {}",
                money(currency, insured),
                money(currency, required),
                money(currency, required - insured),
            ))
            .expected(format!(">= {}", money(currency, required)))
            .actual(money(currency, insured))
            .suggestion(format!("Increase the insured amount to at least {pct:.0}% of the credit amount."))
            .field(LcField::Amount.name())
            .ucp("UCP600 Article 28(f)(ii)")
            .isbp("ISBP745 K12")
            .build(),
    ))
}

fn effective_date(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let dated = ctx
        .doc(DocumentType::Insurance)
        .and_then(|d| d.date(keys::INSURANCE_DATE));
    let shipped = ctx
        .doc(DocumentType::BillOfLading)
        .and_then(|d| d.date(keys::SHIPMENT_DATE));
    let Some((dated, shipped)) = both(dated, shipped) else {
        return Ok(Check::Skip("insurance or shipment date not available"));
    };
    if dated <= shipped {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[1]
            .issue(Severity::Major)
            .message(format!(
                "The insurance document is dated {dated}, after shipment on {shipped}, and does not show cover effective from shipment."
            ))
            .expected(format!("Dated on or before {shipped}"))
            .actual(dated.to_string())
            .suggestion("Obtain an insurance document dated no later than shipment or stating cover from that date.")
            .ucp("UCP600 Article 28(e)")
            .isbp("ISBP745 K10")
            .build(),
    ))
}

fn currency(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let presented = ctx.doc(DocumentType::Insurance).and_then(|d| {
        d.text(keys::CURRENCY)
            .or_else(|| d.text(keys::INSURED_AMOUNT))
            .and_then(|t| parse_currency(&t))
    });
    let Some((presented, expected)) = both(presented, ctx.lc_currency()) else {
        return Ok(Check::Skip("currency not available"));
    };
    if presented == expected {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[2]
            .issue(Severity::Major)
            .message(format!("Cover is expressed in {presented}; the credit is in {expected}."))
            .expected(expected)
            .actual(presented)
            .suggestion("Insurance must be in the currency of the credit.")
            .field(LcField::Currency.name())
            .ucp("UCP600 Article 28(f)(i)")
            .build(),
    ))
}
