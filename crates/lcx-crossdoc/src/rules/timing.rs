//! Presentation timing (UCP 600 Art. 14(c) and 16).
//!
//! Deadline = min(shipment date + presentation period, LC expiry). The
//! presentation period is the LC term when stated, else the configured
//! default of 21 days.

use chrono::{Duration, NaiveDate};
use lcx_core::parse::parse_days;
use lcx_core::{DocumentType, LcField, Severity};

use super::{Check, CheckContext, RuleSpec};
use crate::document::keys;
use crate::error::RuleFault;

const PAIR: (DocumentType, DocumentType) = (DocumentType::BillOfLading, DocumentType::LetterOfCredit);

/// Timing rules.
pub const RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "CROSSDOC-TIME-001",
        title: "Presentation Period Exceeded",
        pair: PAIR,
        requires: &[DocumentType::BillOfLading],
        check: overdue,
    },
    RuleSpec {
        id: "CROSSDOC-TIME-002",
        title: "Presentation Deadline Approaching",
        pair: PAIR,
        requires: &[DocumentType::BillOfLading],
        check: approaching,
    },
];

struct Deadline {
    shipment: NaiveDate,
    period: i64,
    date: NaiveDate,
    capped_by_expiry: bool,
}

fn deadline(ctx: &CheckContext<'_>) -> Option<Deadline> {
    let shipment = ctx.doc(DocumentType::BillOfLading)?.date(keys::SHIPMENT_DATE)?;
    let period = ctx
        .lc_text(LcField::PresentationPeriod)
        .and_then(parse_days)
        .unwrap_or(ctx.config.presentation_period_days);
    // A period past the calendar range leaves only the expiry as a bound.
    let by_period = Duration::try_days(period).and_then(|d| shipment.checked_add_signed(d));
    let (date, capped_by_expiry) = match (by_period, ctx.lc_date(LcField::ExpiryDate)) {
        (Some(by_period), Some(expiry)) if expiry < by_period => (expiry, true),
        (Some(by_period), _) => (by_period, false),
        (None, Some(expiry)) => (expiry, true),
        (None, None) => return None,
    };
    Some(Deadline {
        shipment,
        period,
        date,
        capped_by_expiry,
    })
}

fn describe(d: &Deadline) -> String {
    if d.capped_by_expiry {
        format!("{} (LC expiry, before {} days after shipment on {})", d.date, d.period, d.shipment)
    } else {
        format!("{} ({} days after shipment on {})", d.date, d.period, d.shipment)
    }
}

fn overdue(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let Some(d) = deadline(ctx) else {
        return Ok(Check::Skip("no presentation deadline can be derived"));
    };
    let late = (ctx.today - d.date).num_days();
    if late <= 0 {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[0]
            .issue(Severity::Critical)
            .message(format!(
                "Documents are presented {late} day(s) after the last day for presentation, {}.",
                describe(&d)
            ))
            .expected(format!("Presentation on or before {}", d.date))
            .actual(format!("Presented on {}", ctx.today))
            .suggestion("Late presentation is a discrepancy; seek the applicant's waiver.")
            .field(LcField::PresentationPeriod.name())
            .ucp("UCP600 Article 14(c)")
            .build(),
    ))
}

fn approaching(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let Some(d) = deadline(ctx) else {
        return Ok(Check::Skip("no presentation deadline can be derived"));
    };
    let remaining = (d.date - ctx.today).num_days();
    if remaining < 0 {
        return Ok(Check::Skip("presentation already overdue"));
    }
    if remaining > ctx.config.presentation_warning_days {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[1]
            .issue(Severity::Minor)
            .message(format!(
                "{remaining} day(s) remain for presentation; the last day is {}.",
                describe(&d)
            ))
            .expected(format!(
                "More than {} days remaining for presentation",
                ctx.config.presentation_warning_days
            ))
            .actual(format!("{remaining} day(s) remaining"))
            .suggestion("Complete the presentation before the deadline.")
            .field(LcField::PresentationPeriod.name())
            .ucp("UCP600 Article 16")
            .build(),
    ))
}
