//! Commercial invoice against the credit (UCP 600 Art. 18).

use lcx_core::parse::parse_currency;
use lcx_core::{DocumentType, LcField, Severity};

use super::{both, compact, money, Check, CheckContext, RuleSpec, ToleranceBasis};
use crate::document::keys;
use crate::error::RuleFault;

const PAIR: (DocumentType, DocumentType) = (DocumentType::Invoice, DocumentType::LetterOfCredit);
const INVOICE: &[DocumentType] = &[DocumentType::Invoice];

/// Invoice rules.
pub const RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "CROSSDOC-INV-001",
        title: "Invoice Amount Exceeds LC",
        pair: PAIR,
        requires: INVOICE,
        check: amount,
    },
    RuleSpec {
        id: "CROSSDOC-INV-002",
        title: "Invoice Not Issued by Beneficiary",
        pair: PAIR,
        requires: INVOICE,
        check: issuer,
    },
    RuleSpec {
        id: "CROSSDOC-INV-003",
        title: "Goods Description Does Not Correspond",
        pair: PAIR,
        requires: INVOICE,
        check: goods,
    },
    RuleSpec {
        id: "CROSSDOC-INV-004",
        title: "Invoice Dated After LC Expiry",
        pair: PAIR,
        requires: INVOICE,
        check: date,
    },
    RuleSpec {
        id: "CROSSDOC-INV-005",
        title: "Invoice LC Reference Mismatch",
        pair: PAIR,
        requires: INVOICE,
        check: lc_reference,
    },
    RuleSpec {
        id: "CROSSDOC-INV-006",
        title: "Invoice Currency Differs from LC",
        pair: PAIR,
        requires: INVOICE,
        check: currency,
    },
];

fn amount(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let invoice = ctx.doc(DocumentType::Invoice).and_then(|d| d.amount(keys::AMOUNT));
    let Some((invoiced, lc_amount)) = both(invoice, ctx.lc_amount()) else {
        return Ok(Check::Skip("amount not available"));
    };
    let (tolerance, basis) = ctx.tolerance();
    let maximum = lc_amount * (1.0 + tolerance);
    if invoiced <= maximum + ctx.config.amount_epsilon {
        return Ok(Check::Pass);
    }
    let currency = ctx.lc_currency();
    let currency = currency.as_deref();
    let pct = tolerance * 100.0;
    let basis = match basis {
        ToleranceBasis::Stated => "stated tolerance",
        ToleranceBasis::Approximate => "tolerance for an approximate amount",
        ToleranceBasis::Default => "tolerance",
    };
    Ok(Check::Fail(
        RULES[0]
            .issue(Severity::Critical)
            .message(format!(
                "Invoice amount {} exceeds LC amount {} plus {pct:.0}% {basis} (maximum {}).",
                money(currency, invoiced),
                money(currency, lc_amount),
                money(currency, maximum),
            ))
            .expected(format!("<= {}", money(currency, maximum)))
            .actual(money(currency, invoiced))
            .suggestion("Reduce the invoice amount to within the credit amount and tolerance.")
            .field(LcField::Amount.name())
            .ucp("UCP600 Article 18(b)")
            .isbp("ISBP745 C13")
            .build(),
    ))
}

fn issuer(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let invoice = ctx.doc(DocumentType::Invoice).and_then(|d| d.text(keys::ISSUER));
    let Some((issuer, beneficiary)) = both(invoice, ctx.lc_text(LcField::Beneficiary)) else {
        return Ok(Check::Skip("issuer or beneficiary not available"));
    };
    let result = ctx.party.match_names(&issuer, beneficiary);
    if result.matched {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[1]
            .issue(Severity::Critical)
            .message(format!(
                "The invoice is issued by \"{issuer}\", which does not match the beneficiary \"{beneficiary}\" (confidence {:.2}).",
                result.confidence
            ))
            .expected(beneficiary)
            .actual(issuer)
            .suggestion("The invoice must appear to be issued by the beneficiary.")
            .field(LcField::Beneficiary.name())
            .ucp("UCP600 Article 18(a)(i)")
            .build(),
    ))
}

fn goods(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let invoice = ctx.doc(DocumentType::Invoice).and_then(|d| d.text(keys::GOODS));
    let Some((presented, reference)) = both(invoice, ctx.lc_text(LcField::GoodsDescription)) else {
        return Ok(Check::Skip("goods description not available"));
    };
    let result = ctx.goods.correspond(reference, &presented);
    if result.corresponds {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[2]
            .issue(Severity::Major)
            .message(format!(
                "The invoice goods description does not correspond with the credit (similarity {:.2}).",
                result.confidence
            ))
            .expected(reference)
            .actual(presented)
            .suggestion("Describe the goods on the invoice as they appear in the credit.")
            .field(LcField::GoodsDescription.name())
            .ucp("UCP600 Article 18(c)")
            .isbp("ISBP745 C3")
            .build(),
    ))
}

fn date(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let invoice = ctx.doc(DocumentType::Invoice).and_then(|d| d.date(keys::INVOICE_DATE));
    let Some((dated, expiry)) = both(invoice, ctx.lc_date(LcField::ExpiryDate)) else {
        return Ok(Check::Skip("invoice date or expiry not available"));
    };
    if dated <= expiry {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[3]
            .issue(Severity::Critical)
            .message(format!("The invoice is dated {dated}, after the credit expired on {expiry}."))
            .expected(format!("Invoice dated on or before {expiry}"))
            .actual(dated.to_string())
            .suggestion("Check the invoice date; a document dated after expiry cannot comply.")
            .field(LcField::ExpiryDate.name())
            .ucp("UCP600 Article 6(d)(i)")
            .build(),
    ))
}

fn lc_reference(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let invoice = ctx.doc(DocumentType::Invoice).and_then(|d| d.text(keys::LC_REFERENCE));
    let Some((quoted, number)) = both(invoice, ctx.lc_text(LcField::LcNumber)) else {
        return Ok(Check::Skip("LC reference not available"));
    };
    let (a, b) = (compact(&quoted), compact(number));
    if a == b {
        return Ok(Check::Pass);
    }
    // A truncated or padded reference is a typing slip, not a different credit.
    let partial = !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a));
    let severity = if partial { Severity::Minor } else { Severity::Major };
    Ok(Check::Fail(
        RULES[4]
            .issue(severity)
            .message(format!("The invoice quotes credit number \"{quoted}\" instead of \"{number}\"."))
            .expected(number)
            .actual(quoted)
            .suggestion("Correct the credit number quoted on the invoice.")
            .field(LcField::LcNumber.name())
            .isbp("ISBP745 A19")
            .build(),
    ))
}

fn currency(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let invoice = ctx.doc(DocumentType::Invoice).and_then(|d| {
        d.text(keys::CURRENCY)
            .or_else(|| d.text(keys::AMOUNT))
            .and_then(|t| parse_currency(&t))
    });
    let Some((presented, expected)) = both(invoice, ctx.lc_currency()) else {
        return Ok(Check::Skip("currency not available"));
    };
    if presented == expected {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[5]
            .issue(Severity::Major)
            .message(format!("The invoice is made out in {presented}; the credit is in {expected}."))
            .expected(expected)
            .actual(presented)
            .suggestion("Invoice in the currency of the credit.")
            .field(LcField::Currency.name())
            .ucp("UCP600 Article 18(a)(iii)")
            .build(),
    ))
}
