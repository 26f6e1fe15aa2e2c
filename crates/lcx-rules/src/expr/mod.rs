//! # Rule Expression Language
//!
//! A small, side-effect free language for rule checks:
//!
//! ```text
//! amount(invoice.amount) <= amount(lc.amount) * 1.05
//! upper(lc.incoterm) in ['CIF', 'CIP'] and exists(insurance)
//! ```
//!
//! Expressions compile once at pack load. Unknown functions, wrong arity
//! and syntax errors are [`CompileError`]s. Evaluation is three-valued:
//! a result of `null` means the rule could not be checked.

pub mod ast;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod value;

use crate::context::RuleContext;
use crate::error::{CompileError, EvalError};

pub use ast::Expr;
pub use functions::Function;
pub use value::Value;

/// A compiled expression with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    source: String,
    expr: Expr,
}

impl CompiledExpr {
    /// Compile an expression.
    pub fn compile(source: &str) -> Result<Self, CompileError> {
        let expr = parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// Source text as written in the pack.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Syntax tree.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate against a context.
    pub fn evaluate(&self, ctx: &RuleContext) -> Result<Value, EvalError> {
        eval::evaluate(&self.expr, ctx)
    }

    /// Evaluate as a condition: `Some(bool)` or `None` when the result is
    /// `null`. Non-boolean results are an error.
    pub fn evaluate_condition(&self, ctx: &RuleContext) -> Result<Option<bool>, EvalError> {
        match self.evaluate(ctx)? {
            Value::Bool(b) => Ok(Some(b)),
            Value::Null => Ok(None),
            other => Err(EvalError::NotBoolean(other.type_name())),
        }
    }
}
