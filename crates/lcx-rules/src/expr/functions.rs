//! Built-in functions.
//!
//! Names and arities are fixed at compile time; an unknown name in a rule
//! pack is a load error. Functions are null-propagating unless stated
//! otherwise: a `null` argument yields `null`.

use lcx_core::parse::{parse_amount, parse_date};
use lcx_match::text::token_similarity;

use super::value::Value;
use crate::context::RuleContext;
use crate::error::{CompileError, EvalError};

/// A built-in function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// `exists(x)`: present (never null).
    Exists,
    /// `len(x)`: string length in characters or list length.
    Len,
    /// `lower(s)`
    Lower,
    /// `upper(s)`
    Upper,
    /// `trim(s)`
    Trim,
    /// `contains(haystack, needle)`: case-insensitive substring, or list membership.
    Contains,
    /// `starts_with(s, prefix)`: case-insensitive.
    StartsWith,
    /// `ends_with(s, suffix)`: case-insensitive.
    EndsWith,
    /// `abs(n)`
    Abs,
    /// `min(n, ...)`
    Min,
    /// `max(n, ...)`
    Max,
    /// `round(n)` or `round(n, digits)`
    Round,
    /// `amount(x)`: tolerant monetary parse.
    Amount,
    /// `date(x)`: tolerant date parse, ISO string.
    Date,
    /// `days_between(a, b)`: `b - a` in days.
    DaysBetween,
    /// `today()`: examination date, ISO string.
    Today,
    /// `coalesce(x, ...)`: first present argument (never null unless all are).
    Coalesce,
    /// `similarity(a, b)`: content-token Jaccard in `[0, 1]`.
    Similarity,
    /// `party_match(a, b)`: party-name confidence in `[0, 1]`.
    PartyMatch,
}

const NAMES: &[(&str, Function)] = &[
    ("exists", Function::Exists),
    ("len", Function::Len),
    ("lower", Function::Lower),
    ("upper", Function::Upper),
    ("trim", Function::Trim),
    ("contains", Function::Contains),
    ("starts_with", Function::StartsWith),
    ("ends_with", Function::EndsWith),
    ("abs", Function::Abs),
    ("min", Function::Min),
    ("max", Function::Max),
    ("round", Function::Round),
    ("amount", Function::Amount),
    ("date", Function::Date),
    ("days_between", Function::DaysBetween),
    ("today", Function::Today),
    ("coalesce", Function::Coalesce),
    ("similarity", Function::Similarity),
    ("party_match", Function::PartyMatch),
];

impl Function {
    /// Resolve a function by name.
    pub fn from_name(name: &str) -> Option<Self> {
        NAMES.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }

    /// Function name as written in expressions.
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(_, f)| *f == self)
            .map_or("?", |(n, _)| *n)
    }

    /// Accepted argument counts: minimum and optional maximum.
    pub fn arity(self) -> (usize, Option<usize>) {
        match self {
            Self::Today => (0, Some(0)),
            Self::Exists
            | Self::Len
            | Self::Lower
            | Self::Upper
            | Self::Trim
            | Self::Abs
            | Self::Amount
            | Self::Date => (1, Some(1)),
            Self::Round => (1, Some(2)),
            Self::Contains
            | Self::StartsWith
            | Self::EndsWith
            | Self::DaysBetween
            | Self::Similarity
            | Self::PartyMatch => (2, Some(2)),
            Self::Min | Self::Max | Self::Coalesce => (1, None),
        }
    }

    /// Reject a call with the wrong number of arguments.
    pub fn check_arity(self, found: usize) -> Result<(), CompileError> {
        let (min, max) = self.arity();
        let ok = found >= min && max.map_or(true, |m| found <= m);
        if ok {
            return Ok(());
        }
        let expected = match max {
            Some(m) if m == min => min.to_string(),
            Some(m) => format!("{min}..={m}"),
            None => format!("at least {min}"),
        };
        Err(CompileError::WrongArity {
            name: self.name().to_string(),
            expected,
            found,
        })
    }

    /// Apply the function to evaluated arguments.
    pub fn call(self, args: &[Value], ctx: &RuleContext) -> Result<Value, EvalError> {
        match self {
            Self::Exists => Ok(Value::Bool(args.iter().all(Value::is_present))),
            Self::Coalesce => Ok(args
                .iter()
                .find(|v| v.is_present())
                .cloned()
                .unwrap_or(Value::Null)),
            Self::Today => Ok(Value::String(ctx.today().format("%Y-%m-%d").to_string())),
            _ if args.iter().any(Value::is_null) => Ok(Value::Null),
            Self::Len => match &args[0] {
                Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
                Value::List(items) => Ok(Value::Number(items.len() as f64)),
                other => Err(self.mismatch(other)),
            },
            Self::Lower => self.map_text(&args[0], |s| s.to_lowercase()),
            Self::Upper => self.map_text(&args[0], |s| s.to_uppercase()),
            Self::Trim => self.map_text(&args[0], |s| s.trim().to_string()),
            Self::Contains => match (&args[0], &args[1]) {
                (Value::List(items), needle) => Ok(Value::Bool(items.contains(needle))),
                (hay, needle) => self.compare_text(hay, needle, |h, n| h.contains(n)),
            },
            Self::StartsWith => self.compare_text(&args[0], &args[1], |h, n| h.starts_with(n)),
            Self::EndsWith => self.compare_text(&args[0], &args[1], |h, n| h.ends_with(n)),
            Self::Abs => Ok(Value::Number(self.number(&args[0])?.abs())),
            Self::Min | Self::Max => {
                let mut best = self.number(&args[0])?;
                for arg in &args[1..] {
                    let n = self.number(arg)?;
                    best = if self == Self::Min { best.min(n) } else { best.max(n) };
                }
                Ok(Value::Number(best))
            }
            Self::Round => {
                let n = self.number(&args[0])?;
                let digits = match args.get(1) {
                    Some(d) => self.number(d)?,
                    None => 0.0,
                };
                if !(0.0..=10.0).contains(&digits) {
                    return Err(EvalError::InvalidArgument {
                        function: "round",
                        message: format!("digits must be within 0..=10, got {digits}"),
                    });
                }
                let factor = 10f64.powi(digits as i32);
                Ok(Value::Number((n * factor).round() / factor))
            }
            Self::Amount => Ok(match &args[0] {
                Value::Number(n) => Value::Number(*n),
                Value::String(s) => parse_amount(s).map_or(Value::Null, Value::Number),
                _ => Value::Null,
            }),
            Self::Date => Ok(as_date(&args[0])
                .map_or(Value::Null, |d| Value::String(d.format("%Y-%m-%d").to_string()))),
            Self::DaysBetween => Ok(match (as_date(&args[0]), as_date(&args[1])) {
                (Some(a), Some(b)) => Value::Number((b - a).num_days() as f64),
                _ => Value::Null,
            }),
            Self::Similarity => {
                let (a, b) = self.text_pair(&args[0], &args[1])?;
                Ok(Value::Number(token_similarity(&a, &b)))
            }
            Self::PartyMatch => {
                let (a, b) = self.text_pair(&args[0], &args[1])?;
                Ok(Value::Number(ctx.party_matcher().match_names(&a, &b).confidence))
            }
        }
    }

    fn mismatch(self, value: &Value) -> EvalError {
        EvalError::TypeMismatch {
            op: self.name().to_string(),
            left: value.type_name(),
            right: "-",
        }
    }

    fn number(self, value: &Value) -> Result<f64, EvalError> {
        match value {
            Value::Number(n) => Ok(*n),
            other => Err(self.mismatch(other)),
        }
    }

    fn text(self, value: &Value) -> Result<String, EvalError> {
        value.as_text().ok_or_else(|| self.mismatch(value))
    }

    fn text_pair(self, a: &Value, b: &Value) -> Result<(String, String), EvalError> {
        Ok((self.text(a)?, self.text(b)?))
    }

    fn map_text(self, value: &Value, f: impl Fn(&str) -> String) -> Result<Value, EvalError> {
        Ok(Value::String(f(&self.text(value)?)))
    }

    fn compare_text(
        self,
        hay: &Value,
        needle: &Value,
        f: impl Fn(&str, &str) -> bool,
    ) -> Result<Value, EvalError> {
        let (h, n) = self.text_pair(hay, needle)?;
        Ok(Value::Bool(f(&h.to_uppercase(), &n.to_uppercase())))
    }
}

fn as_date(value: &Value) -> Option<chrono::NaiveDate> {
    match value {
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx() -> RuleContext {
        RuleContext::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
    }

    fn s(v: &str) -> Value {
        Value::String(v.into())
    }

    #[test]
    fn names_round_trip() {
        for (name, f) in NAMES {
            assert_eq!(Function::from_name(name), Some(*f));
            assert_eq!(f.name(), *name);
        }
        assert_eq!(Function::from_name("eval"), None);
    }

    #[test]
    fn arity_messages() {
        let err = Function::Round.check_arity(3).unwrap_err();
        assert_eq!(
            err,
            CompileError::WrongArity {
                name: "round".into(),
                expected: "1..=2".into(),
                found: 3
            }
        );
        assert!(Function::Coalesce.check_arity(0).is_err());
        assert!(Function::Coalesce.check_arity(9).is_ok());
    }

    #[test]
    fn null_propagates_except_exists_and_coalesce() {
        let c = ctx();
        assert_eq!(Function::Upper.call(&[Value::Null], &c).unwrap(), Value::Null);
        assert_eq!(Function::Exists.call(&[Value::Null], &c).unwrap(), Value::Bool(false));
        assert_eq!(
            Function::Coalesce.call(&[Value::Null, s(""), s("x")], &c).unwrap(),
            s("x")
        );
    }

    #[test]
    fn amount_and_date_parsing() {
        let c = ctx();
        assert_eq!(
            Function::Amount.call(&[s("USD 1,250.50")], &c).unwrap(),
            Value::Number(1250.5)
        );
        assert_eq!(Function::Amount.call(&[s("n/a")], &c).unwrap(), Value::Null);
        assert_eq!(Function::Date.call(&[s("15/03/2026")], &c).unwrap(), s("2026-03-15"));
        assert_eq!(
            Function::DaysBetween
                .call(&[s("2026-03-01"), s("2026-03-22")], &c)
                .unwrap(),
            Value::Number(21.0)
        );
        assert_eq!(Function::Today.call(&[], &c).unwrap(), s("2026-03-01"));
    }

    #[test]
    fn text_functions_are_case_insensitive() {
        let c = ctx();
        assert_eq!(
            Function::Contains.call(&[s("Freight Prepaid"), s("PREPAID")], &c).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            Function::StartsWith.call(&[s("CIF Chattogram"), s("cif")], &c).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn numeric_functions() {
        let c = ctx();
        let args = [Value::Number(3.0), Value::Number(-1.0), Value::Number(2.0)];
        assert_eq!(Function::Min.call(&args, &c).unwrap(), Value::Number(-1.0));
        assert_eq!(Function::Max.call(&args, &c).unwrap(), Value::Number(3.0));
        assert_eq!(
            Function::Round.call(&[Value::Number(2.345), Value::Number(1.0)], &c).unwrap(),
            Value::Number(2.3)
        );
        assert!(matches!(
            Function::Abs.call(&[s("x")], &c),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn party_match_uses_matcher() {
        let c = ctx();
        let v = Function::PartyMatch
            .call(&[s("Acme Trading Ltd"), s("ACME TRADING LIMITED")], &c)
            .unwrap();
        assert_eq!(v, Value::Number(1.0));
    }
}
