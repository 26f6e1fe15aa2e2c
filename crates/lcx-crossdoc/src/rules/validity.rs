//! LC validity: expiry relative to the examination date.

use lcx_core::{DocumentType, LcField, Severity};

use super::{Check, CheckContext, RuleSpec};
use crate::error::RuleFault;

const LC: (DocumentType, DocumentType) = (DocumentType::LetterOfCredit, DocumentType::LetterOfCredit);

/// Validity rules.
pub const RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "CROSSDOC-LC-001",
        title: "Letter of Credit Expired",
        pair: LC,
        requires: &[],
        check: expired,
    },
    RuleSpec {
        id: "CROSSDOC-LC-002",
        title: "Letter of Credit Expiring Soon",
        pair: LC,
        requires: &[],
        check: expiring_soon,
    },
    RuleSpec {
        id: "CROSSDOC-LC-003",
        title: "Expiry Date Unparseable",
        pair: LC,
        requires: &[],
        check: unparseable_expiry,
    },
];

fn expired(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let Some(expiry) = ctx.lc_date(LcField::ExpiryDate) else {
        return Ok(Check::Skip("expiry date not available"));
    };
    let overdue = (ctx.today - expiry).num_days();
    if overdue <= 0 {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[0]
            .issue(Severity::Critical)
            .message(format!(
                "The credit expired on {expiry}, {overdue} day(s) before the examination date {}.",
                ctx.today
            ))
            .expected(format!("Presentation on or before {expiry}"))
            .actual(format!("Examined on {}", ctx.today))
            .suggestion("Request an amendment extending the expiry date or confirm presentation was made in time.")
            .field(LcField::ExpiryDate.name())
            .ucp("UCP600 Article 6(d)(i)")
            .build(),
    ))
}

fn expiring_soon(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let Some(expiry) = ctx.lc_date(LcField::ExpiryDate) else {
        return Ok(Check::Skip("expiry date not available"));
    };
    let remaining = (expiry - ctx.today).num_days();
    if remaining < 0 {
        return Ok(Check::Skip("credit already expired"));
    }
    if remaining > ctx.config.expiry_warning_days {
        return Ok(Check::Pass);
    }
    let severity = if remaining <= ctx.config.expiry_critical_days {
        Severity::Critical
    } else {
        Severity::Major
    };
    Ok(Check::Fail(
        RULES[1]
            .issue(severity)
            .message(format!("The credit expires on {expiry}, {remaining} day(s) from now."))
            .expected(format!(
                "More than {} days of validity remaining",
                ctx.config.expiry_warning_days
            ))
            .actual(format!("{remaining} day(s) remaining"))
            .suggestion("Present documents immediately or request an extension.")
            .field(LcField::ExpiryDate.name())
            .ucp("UCP600 Article 6(d)(i)")
            .build(),
    ))
}

fn unparseable_expiry(ctx: &CheckContext<'_>) -> Result<Check, RuleFault> {
    let Some(raw) = ctx.lc_text(LcField::ExpiryDate) else {
        return Ok(Check::Skip("expiry date not available"));
    };
    if ctx.lc_date(LcField::ExpiryDate).is_some() {
        return Ok(Check::Pass);
    }
    Ok(Check::Fail(
        RULES[2]
            .issue(Severity::Major)
            .message(format!("The expiry date \"{raw}\" is unparseable; validity cannot be checked."))
            .expected("A valid expiry date (field 31D)")
            .actual(raw)
            .suggestion("Verify the expiry date on the credit and re-extract it.")
            .field(LcField::ExpiryDate.name())
            .ucp("UCP600 Article 6(d)(i)")
            .build(),
    ))
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::document::SupportingDocument;
    use lcx_core::LcBaseline;

    fn harness() -> Harness {
        Harness::new(one(DocumentType::Invoice, SupportingDocument::new()))
    }

    #[test]
    fn expired_credit_is_critical() {
        let mut h = harness();
        h.today = date(2026, 5, 2);
        let issue = failed(h.run(RULES, "CROSSDOC-LC-001"));
        assert_eq!(issue.severity(), Severity::Critical);
        assert!(issue.message().contains("2 day(s)"));
    }

    #[test]
    fn expiry_day_itself_is_valid() {
        let mut h = harness();
        h.today = date(2026, 4, 30);
        assert_eq!(h.run(RULES, "CROSSDOC-LC-001"), Check::Pass);
        // Zero days remaining is inside the critical window.
        let issue = failed(h.run(RULES, "CROSSDOC-LC-002"));
        assert_eq!(issue.severity(), Severity::Critical);
    }

    #[test]
    fn expiring_window_grades_severity() {
        let mut h = harness();
        h.today = date(2026, 4, 25);
        assert_eq!(failed(h.run(RULES, "CROSSDOC-LC-002")).severity(), Severity::Major);
        h.today = date(2026, 4, 1);
        assert_eq!(h.run(RULES, "CROSSDOC-LC-002"), Check::Pass);
        h.today = date(2026, 5, 10);
        assert!(matches!(h.run(RULES, "CROSSDOC-LC-002"), Check::Skip(_)));
    }

    #[test]
    fn unparseable_expiry_is_major() {
        let mut h = harness();
        h.baseline = LcBaseline::builder()
            .extracted(LcField::ExpiryDate, "end of April", 0.8)
            .build();
        let issue = failed(h.run(RULES, "CROSSDOC-LC-003"));
        assert_eq!(issue.severity(), Severity::Major);
        assert!(issue.message().contains("unparseable"));
        assert!(matches!(h.run(RULES, "CROSSDOC-LC-001"), Check::Skip(_)));
    }

    #[test]
    fn missing_expiry_is_skipped() {
        let mut h = harness();
        h.baseline = LcBaseline::builder().build();
        assert!(matches!(h.run(RULES, "CROSSDOC-LC-003"), Check::Skip(_)));
    }
}
