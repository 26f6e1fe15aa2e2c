//! # Rule Engine Errors
//!
//! Two phases, two error types. [`CompileError`] and [`RuleLoadError`] are
//! configuration faults: they surface when packs are loaded and must stop
//! the process before it accepts validation traffic. [`EvalError`] surfaces
//! while a single rule runs and becomes an errored outcome for that rule
//! only.
//!
//! An unknown context path is not an error: it evaluates to `null`.

use std::path::PathBuf;

use thiserror::Error;

/// Expression compilation failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Lexical or grammatical error.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax {
        /// Byte offset into the expression source.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// Function name not in the built-in set.
    #[error("unknown function \"{name}\" at offset {offset}")]
    UnknownFunction {
        /// The name used.
        name: String,
        /// Byte offset of the call.
        offset: usize,
    },

    /// Function called with the wrong number of arguments.
    #[error("function \"{name}\" expects {expected} argument(s), got {found}")]
    WrongArity {
        /// The function.
        name: String,
        /// Accepted argument count, e.g. `"2"` or `"1..=2"`.
        expected: String,
        /// Arguments supplied.
        found: usize,
    },
}

/// Rule pack load failure. Fatal at startup.
#[derive(Error, Debug)]
pub enum RuleLoadError {
    /// A rule expression does not compile.
    #[error("rule {rule_id}: {source}")]
    Compile {
        /// Offending rule.
        rule_id: String,
        /// Compilation error.
        #[source]
        source: CompileError,
    },

    /// Handler name not in the static registry.
    #[error("rule {rule_id}: unknown handler \"{handler}\"")]
    UnknownHandler {
        /// Offending rule.
        rule_id: String,
        /// Name used.
        handler: String,
    },

    /// Handler parameters rejected by the handler's validator.
    #[error("rule {rule_id}: invalid params for handler \"{handler}\": {message}")]
    InvalidParams {
        /// Offending rule.
        rule_id: String,
        /// Handler name.
        handler: String,
        /// Validator message.
        message: String,
    },

    /// The same rule id appears twice inside one pack.
    #[error("pack {pack_id}: duplicate rule id {rule_id}")]
    DuplicateRule {
        /// Pack containing the duplicate.
        pack_id: String,
        /// Duplicated id.
        rule_id: String,
    },

    /// A rule id is blank.
    #[error("pack {pack_id}: rule with empty id")]
    EmptyRuleId {
        /// Pack containing the rule.
        pack_id: String,
    },

    /// Pack YAML could not be parsed.
    #[error("rule pack YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Pack file could not be read.
    #[error("cannot read rule pack {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure while evaluating one rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Operator applied to operands of the wrong type.
    #[error("type mismatch: {op} on {left} and {right}")]
    TypeMismatch {
        /// Operator or function.
        op: String,
        /// Left operand type.
        left: &'static str,
        /// Right operand type (or `-` for unary).
        right: &'static str,
    },

    /// Division or remainder by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A rule check produced a non-boolean value.
    #[error("check must produce a boolean, got {0}")]
    NotBoolean(&'static str),

    /// A function received an argument it cannot use.
    #[error("{function}: {message}")]
    InvalidArgument {
        /// Function name.
        function: &'static str,
        /// What was wrong.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_name_the_rule() {
        let err = RuleLoadError::Compile {
            rule_id: "UCP600-ART6".into(),
            source: CompileError::UnknownFunction {
                name: "frobnicate".into(),
                offset: 0,
            },
        };
        let text = err.to_string();
        assert!(text.contains("UCP600-ART6"));
        assert!(text.contains("frobnicate"));
    }

    #[test]
    fn eval_error_display() {
        let err = EvalError::TypeMismatch {
            op: "<".into(),
            left: "string",
            right: "number",
        };
        assert_eq!(err.to_string(), "type mismatch: < on string and number");
    }
}
