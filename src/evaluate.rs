use std::cmp::Ordering;

use chrono::NaiveDate;
use winnow::ascii::digit1;
use winnow::combinator::eof;
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::take_while;

use crate::{ComparisonOp, EngineError, Predicate, Registry, State};

/// Evaluate a predicate against a state.
///
/// Named predicates and predicate functions are resolved through `registry`.
///
/// # Errors
///
/// Returns [`EngineError::UndefinedValue`] when a referenced variable is not in
/// the state, [`EngineError::UnknownPredicate`] when a name is not registered,
/// and [`EngineError::InvalidDate`] when a date comparison meets a value that
/// is not a date.
pub fn evaluate(
    predicate: &Predicate,
    state: &State,
    registry: &Registry,
) -> Result<bool, EngineError> {
    match predicate {
        Predicate::Equality {
            varname,
            expected_value,
        } => Ok(state
            .get(varname)?
            .as_text()
            .is_some_and(|v| v == expected_value)),
        Predicate::SetMembership { varname, values } => Ok(state
            .get(varname)?
            .as_text()
            .is_some_and(|v| values.iter().any(|candidate| candidate == v))),
        Predicate::Comparison { varname, op, value } => {
            let stored = state.get_text(varname)?;
            let ord = compare_values(varname, stored, value)?;
            Ok(match op {
                ComparisonOp::Less => ord == Ordering::Less,
                ComparisonOp::LessOrEqual => ord != Ordering::Greater,
                ComparisonOp::Greater => ord == Ordering::Greater,
                ComparisonOp::GreaterOrEqual => ord != Ordering::Less,
            })
        }
        Predicate::Named(name) => registry
            .call_predicate(name, state)
            .ok_or_else(|| EngineError::UnknownPredicate { name: name.clone() }),
        Predicate::Otherwise => Ok(true),
        Predicate::Combined(preds) => {
            for p in preds {
                if !evaluate(p, state, registry)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::Function { name, arguments } => registry
            .call_function(name, arguments, state)
            .ok_or_else(|| EngineError::UnknownPredicate {
                name: name.clone(),
            }),
    }
}

/// Order a stored value against a literal. Date literals switch to calendar
/// order; otherwise numbers compare numerically and anything else
/// lexicographically.
fn compare_values(varname: &str, stored: &str, literal: &str) -> Result<Ordering, EngineError> {
    if let Some(parts) = date_parts(literal) {
        let expected = to_date(parts).ok_or_else(|| EngineError::InvalidDate {
            varname: varname.to_owned(),
            value: literal.to_owned(),
        })?;
        let actual = date_parts(stored)
            .and_then(to_date)
            .ok_or_else(|| EngineError::InvalidDate {
                varname: varname.to_owned(),
                value: stored.to_owned(),
            })?;
        return Ok(actual.cmp(&expected));
    }

    match (as_number(stored), as_number(literal)) {
        (Some(a), Some(b)) => Ok(a.partial_cmp(&b).unwrap_or_else(|| stored.cmp(literal))),
        _ => Ok(stored.cmp(literal)),
    }
}

fn as_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn to_date((year, month, day): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `YYYY-M-D` with a 4-digit year and 1-2 digit month and day.
fn date_parts(s: &str) -> Option<(i32, u32, u32)> {
    date_literal.parse(s.trim()).ok()
}

fn date_literal(input: &mut &str) -> ModalResult<(i32, u32, u32)> {
    let year = take_while(4, |c: char| c.is_ascii_digit())
        .parse_to()
        .parse_next(input)?;
    '-'.parse_next(input)?;
    let month = short_number.parse_next(input)?;
    '-'.parse_next(input)?;
    let day = short_number.parse_next(input)?;
    eof.parse_next(input)?;
    Ok((year, month, day))
}

fn short_number(input: &mut &str) -> ModalResult<u32> {
    digit1
        .verify(|d: &str| d.len() <= 2)
        .parse_to()
        .parse_next(input)
}
