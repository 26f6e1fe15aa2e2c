//! Rule faults.
//!
//! A fault is a rule that could not reach a verdict for a reason other
//! than missing data. It never aborts validation: the dispatcher records
//! it as a faulted execution and an advisory issue.

use thiserror::Error;

/// Failure inside a single cross-document rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleFault {
    /// A value had a shape the rule cannot interpret.
    #[error("unexpected input in {field}: {message}")]
    UnexpectedInput {
        /// Document field concerned.
        field: String,
        /// What was wrong.
        message: String,
    },

    /// The rule panicked; the payload message is preserved.
    #[error("rule panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        let fault = RuleFault::UnexpectedInput {
            field: "bill_of_lading.clauses".into(),
            message: "object not supported".into(),
        };
        assert!(fault.to_string().contains("bill_of_lading.clauses"));
    }
}
