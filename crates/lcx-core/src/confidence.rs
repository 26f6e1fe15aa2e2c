//! # Confidence Weighting
//!
//! Extraction confidence below [`LOW_CONFIDENCE_THRESHOLD`] escalates the
//! severity of findings about that field: CRITICAL-priority fields go
//! straight to CRITICAL, all others climb one level.

use crate::domain::{FieldPriority, Severity};

/// Default confidence under which a field's findings are escalated.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Weigh a nominal severity by extraction confidence.
pub fn weigh(severity: Severity, priority: FieldPriority, confidence: f64, threshold: f64) -> Severity {
    if !is_low(confidence, threshold) {
        return severity;
    }
    match priority {
        FieldPriority::Critical => Severity::Critical,
        FieldPriority::Required | FieldPriority::Important | FieldPriority::Optional => {
            severity.escalate()
        }
    }
}

/// `true` when the confidence is below the threshold (NaN counts as low).
pub fn is_low(confidence: f64, threshold: f64) -> bool {
    confidence.is_nan() || confidence < threshold
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn severity() -> impl Strategy<Value = Severity> {
        prop::sample::select(Severity::all().to_vec())
    }

    fn priority() -> impl Strategy<Value = FieldPriority> {
        prop::sample::select(vec![
            FieldPriority::Critical,
            FieldPriority::Required,
            FieldPriority::Important,
            FieldPriority::Optional,
        ])
    }

    proptest! {
        /// Weighting never lowers a severity.
        #[test]
        fn weighting_never_deescalates(s in severity(), p in priority(), c in 0.0f64..=1.0) {
            prop_assert!(weigh(s, p, c, LOW_CONFIDENCE_THRESHOLD) >= s);
        }
    }
}
