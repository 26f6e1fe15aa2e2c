//! # Static Handler Registry
//!
//! Rules that need more than an expression name a handler. Handlers are
//! plain functions in a compile-time table; a pack naming a handler that
//! is not in [`HANDLERS`], or passing parameters the handler rejects, fails
//! to load.
//!
//! Every handler returns [`Verdict::Skip`] when the data it needs is absent
//! or unparseable. Absence of data is never a violation here.

use std::collections::BTreeMap;

use lcx_core::parse::{parse_amount_value, parse_date_value};

use crate::context::RuleContext;
use crate::error::EvalError;

/// Handler parameters as written in the pack.
pub type Params = BTreeMap<String, String>;

/// Result of one handler run.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The check holds.
    Pass,
    /// The check fails; `actual` describes what was found.
    Fail {
        /// Observed state.
        actual: String,
    },
    /// Not checkable with the data at hand.
    Skip,
}

/// A registered handler.
#[derive(Debug, Clone, Copy)]
pub struct HandlerSpec {
    /// Name used in packs.
    pub name: &'static str,
    /// Parameters that must be supplied.
    pub required: &'static [&'static str],
    /// Parameters that may be supplied.
    pub optional: &'static [&'static str],
    /// Extra parameter validation beyond the key lists.
    pub validate: fn(&Params) -> Result<(), String>,
    /// Run the check.
    pub run: fn(&Params, &RuleContext) -> Result<Verdict, EvalError>,
}

impl HandlerSpec {
    /// Validate parameters: required keys present, no unknown keys, then
    /// the handler's own checks.
    pub fn check_params(&self, params: &Params) -> Result<(), String> {
        for key in self.required {
            match params.get(*key) {
                Some(v) if !v.trim().is_empty() => {}
                _ => return Err(format!("missing required parameter \"{key}\"")),
            }
        }
        for key in params.keys() {
            if !self.required.contains(&key.as_str()) && !self.optional.contains(&key.as_str()) {
                return Err(format!("unknown parameter \"{key}\""));
            }
        }
        (self.validate)(params)
    }
}

/// Every registered handler.
pub static HANDLERS: &[HandlerSpec] = &[
    HandlerSpec {
        name: "field_present",
        required: &["path"],
        optional: &[],
        validate: no_extra_checks,
        run: field_present,
    },
    HandlerSpec {
        name: "amount_within_tolerance",
        required: &["amount", "limit"],
        optional: &["tolerance_pct"],
        validate: validate_tolerance,
        run: amount_within_tolerance,
    },
    HandlerSpec {
        name: "date_not_after",
        required: &["date", "limit"],
        optional: &[],
        validate: no_extra_checks,
        run: date_not_after,
    },
    HandlerSpec {
        name: "party_names_match",
        required: &["left", "right"],
        optional: &["strict"],
        validate: validate_strict,
        run: party_names_match,
    },
    HandlerSpec {
        name: "values_equal",
        required: &["left", "right"],
        optional: &["case_insensitive"],
        validate: validate_case_flag,
        run: values_equal,
    },
    HandlerSpec {
        name: "text_corresponds",
        required: &["reference", "presented"],
        optional: &[],
        validate: no_extra_checks,
        run: text_corresponds,
    },
];

/// Look up a handler by name.
pub fn handler(name: &str) -> Option<&'static HandlerSpec> {
    HANDLERS.iter().find(|h| h.name == name)
}

// ---------------------------------------------------------------------------
// Parameter validation
// ---------------------------------------------------------------------------

fn no_extra_checks(_: &Params) -> Result<(), String> {
    Ok(())
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

fn bool_param(params: &Params, key: &str) -> Result<bool, String> {
    match params.get(key) {
        None => Ok(false),
        Some(v) => parse_bool(v).ok_or_else(|| format!("\"{key}\" must be true or false, got \"{v}\"")),
    }
}

fn tolerance_pct(params: &Params) -> Result<f64, String> {
    let Some(raw) = params.get("tolerance_pct") else {
        return Ok(0.0);
    };
    let pct: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("\"tolerance_pct\" must be a number, got \"{raw}\""))?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(format!("\"tolerance_pct\" must be within 0..=100, got {pct}"));
    }
    Ok(pct)
}

fn validate_tolerance(params: &Params) -> Result<(), String> {
    tolerance_pct(params).map(|_| ())
}

fn validate_strict(params: &Params) -> Result<(), String> {
    bool_param(params, "strict").map(|_| ())
}

fn validate_case_flag(params: &Params) -> Result<(), String> {
    bool_param(params, "case_insensitive").map(|_| ())
}

fn runtime_param(name: &'static str, message: String) -> EvalError {
    EvalError::InvalidArgument {
        function: name,
        message,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn param<'a>(params: &'a Params, key: &str) -> &'a str {
    params.get(key).map_or("", String::as_str)
}

fn text_at(ctx: &RuleContext, path: &str) -> Option<String> {
    ctx.lookup_path(path)
        .as_text()
        .filter(|s| !s.trim().is_empty())
}

/// Top-level document named by a path (`invoice` for `invoice.seller`).
fn document_of(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

fn field_present(params: &Params, ctx: &RuleContext) -> Result<Verdict, EvalError> {
    let path = param(params, "path");
    let doc = document_of(path);
    if doc != path && !ctx.has_document(doc) {
        return Ok(Verdict::Skip);
    }
    if ctx.lookup_path(path).is_present() {
        Ok(Verdict::Pass)
    } else {
        Ok(Verdict::Fail {
            actual: format!("{path} not stated"),
        })
    }
}

fn amount_within_tolerance(params: &Params, ctx: &RuleContext) -> Result<Verdict, EvalError> {
    let pct = tolerance_pct(params).map_err(|m| runtime_param("amount_within_tolerance", m))?;
    let amount = ctx.lookup_path_json(param(params, "amount")).and_then(parse_amount_value);
    let limit = ctx.lookup_path_json(param(params, "limit")).and_then(parse_amount_value);
    let (Some(amount), Some(limit)) = (amount, limit) else {
        return Ok(Verdict::Skip);
    };
    let max = limit * (1.0 + pct / 100.0);
    if amount <= max + 0.005 {
        Ok(Verdict::Pass)
    } else {
        Ok(Verdict::Fail {
            actual: format!("{amount:.2} exceeds {max:.2}"),
        })
    }
}

fn date_not_after(params: &Params, ctx: &RuleContext) -> Result<Verdict, EvalError> {
    let date = ctx.lookup_path_json(param(params, "date")).and_then(parse_date_value);
    let limit = ctx.lookup_path_json(param(params, "limit")).and_then(parse_date_value);
    let (Some(date), Some(limit)) = (date, limit) else {
        return Ok(Verdict::Skip);
    };
    if date <= limit {
        Ok(Verdict::Pass)
    } else {
        Ok(Verdict::Fail {
            actual: format!("{date} is after {limit}"),
        })
    }
}

fn party_names_match(params: &Params, ctx: &RuleContext) -> Result<Verdict, EvalError> {
    let strict = bool_param(params, "strict").map_err(|m| runtime_param("party_names_match", m))?;
    let (Some(left), Some(right)) = (
        text_at(ctx, param(params, "left")),
        text_at(ctx, param(params, "right")),
    ) else {
        return Ok(Verdict::Skip);
    };
    let matcher = ctx.party_matcher();
    let result = if strict {
        matcher.match_strict(&left, &right)
    } else {
        matcher.match_names(&left, &right)
    };
    if result.matched {
        Ok(Verdict::Pass)
    } else {
        Ok(Verdict::Fail {
            actual: format!("\"{left}\" vs \"{right}\" (confidence {:.2})", result.confidence),
        })
    }
}

fn values_equal(params: &Params, ctx: &RuleContext) -> Result<Verdict, EvalError> {
    let fold = bool_param(params, "case_insensitive").map_err(|m| runtime_param("values_equal", m))?;
    let (Some(left), Some(right)) = (
        text_at(ctx, param(params, "left")),
        text_at(ctx, param(params, "right")),
    ) else {
        return Ok(Verdict::Skip);
    };
    let equal = if fold {
        left.trim().to_uppercase() == right.trim().to_uppercase()
    } else {
        left.trim() == right.trim()
    };
    if equal {
        Ok(Verdict::Pass)
    } else {
        Ok(Verdict::Fail {
            actual: format!("\"{left}\" != \"{right}\""),
        })
    }
}

fn text_corresponds(params: &Params, ctx: &RuleContext) -> Result<Verdict, EvalError> {
    let (Some(reference), Some(presented)) = (
        text_at(ctx, param(params, "reference")),
        text_at(ctx, param(params, "presented")),
    ) else {
        return Ok(Verdict::Skip);
    };
    let result = ctx.goods_matcher().correspond(&reference, &presented);
    if result.corresponds {
        Ok(Verdict::Pass)
    } else {
        Ok(Verdict::Fail {
            actual: format!("description similarity {:.2}", result.confidence),
        })
    }
}
