//! Evaluator with three-valued logic.
//!
//! `null` means "cannot check". Comparisons and arithmetic with a `null`
//! operand yield `null`; `and`/`or`/`not` follow Kleene semantics, so
//! `false and null` is `false` and `true or null` is `true`.

use std::cmp::Ordering;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::value::Value;
use crate::context::RuleContext;
use crate::error::EvalError;

/// Evaluate an expression against a context.
pub fn evaluate(expr: &Expr, ctx: &RuleContext) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Path(segments) => Ok(ctx.lookup(segments)),
        Expr::List(items) => Ok(Value::List(
            items
                .iter()
                .map(|e| evaluate(e, ctx))
                .collect::<Result<_, _>>()?,
        )),
        Expr::Unary { op, operand } => unary(*op, evaluate(operand, ctx)?),
        Expr::Binary { op: BinaryOp::And, left, right } => {
            let l = truth(evaluate(left, ctx)?, "and")?;
            if l == Some(false) {
                return Ok(Value::Bool(false));
            }
            let r = truth(evaluate(right, ctx)?, "and")?;
            Ok(match (l, r) {
                (_, Some(false)) => Value::Bool(false),
                (Some(true), Some(true)) => Value::Bool(true),
                _ => Value::Null,
            })
        }
        Expr::Binary { op: BinaryOp::Or, left, right } => {
            let l = truth(evaluate(left, ctx)?, "or")?;
            if l == Some(true) {
                return Ok(Value::Bool(true));
            }
            let r = truth(evaluate(right, ctx)?, "or")?;
            Ok(match (l, r) {
                (_, Some(true)) => Value::Bool(true),
                (Some(false), Some(false)) => Value::Bool(false),
                _ => Value::Null,
            })
        }
        Expr::Binary { op, left, right } => {
            let l = evaluate(left, ctx)?;
            let r = evaluate(right, ctx)?;
            binary(*op, l, r)
        }
        Expr::Call { function, args } => {
            let values = args
                .iter()
                .map(|e| evaluate(e, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            function.call(&values, ctx)
        }
    }
}

fn truth(value: Value, op: &str) -> Result<Option<bool>, EvalError> {
    match value {
        Value::Bool(b) => Ok(Some(b)),
        Value::Null => Ok(None),
        other => Err(EvalError::TypeMismatch {
            op: op.to_string(),
            left: other.type_name(),
            right: "-",
        }),
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match (op, value) {
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (op, other) => Err(EvalError::TypeMismatch {
            op: match op {
                UnaryOp::Not => "not".to_string(),
                UnaryOp::Neg => "-".to_string(),
            },
            left: other.type_name(),
            right: "-",
        }),
    }
}

fn mismatch(op: BinaryOp, l: &Value, r: &Value) -> EvalError {
    EvalError::TypeMismatch {
        op: op.symbol().to_string(),
        left: l.type_name(),
        right: r.type_name(),
    }
}

fn binary(op: BinaryOp, l: Value, r: Value) -> Result<Value, EvalError> {
    if l.is_null() || r.is_null() {
        return Ok(Value::Null);
    }
    match op {
        BinaryOp::Eq => Ok(Value::Bool(l == r)),
        BinaryOp::Ne => Ok(Value::Bool(l != r)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => return Err(mismatch(op, &l, &r)),
            };
            let Some(ordering) = ordering else {
                return Ok(Value::Null);
            };
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        BinaryOp::In => match &r {
            Value::List(items) => Ok(Value::Bool(items.contains(&l))),
            Value::String(hay) => match &l {
                Value::String(needle) => Ok(Value::Bool(hay.contains(needle.as_str()))),
                _ => Err(mismatch(op, &l, &r)),
            },
            _ => Err(mismatch(op, &l, &r)),
        },
        BinaryOp::Add => match (&l, &r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            _ => Err(mismatch(op, &l, &r)),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let (Value::Number(a), Value::Number(b)) = (&l, &r) else {
                return Err(mismatch(op, &l, &r));
            };
            match op {
                BinaryOp::Sub => Ok(Value::Number(a - b)),
                BinaryOp::Mul => Ok(Value::Number(a * b)),
                _ if *b == 0.0 => Err(EvalError::DivisionByZero),
                BinaryOp::Div => Ok(Value::Number(a / b)),
                _ => Ok(Value::Number(a % b)),
            }
        }
        // Handled with short-circuiting in `evaluate`.
        BinaryOp::And | BinaryOp::Or => Err(mismatch(op, &l, &r)),
    }
}
