//! Unit expressions such as `kg·m^2/s^2`, `km/h` or `1/(m*s)`.
//!
//! An expression is a numerator followed by any number of `/`-separated
//! denominators. Each part is a `·`- or `*`-separated list of symbols, each
//! optionally raised to an integer power (`m^2`, `s^-1`) or a fraction
//! (`m^(1/2)`). Parentheses around a part are ignored; `1` is the
//! dimensionless unit.

use mensura_core::{Unit, UnitError};

use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Empty unit expression")]
    Empty,
    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),
    #[error("Invalid exponent '{0}'")]
    InvalidExponent(String),
    #[error(transparent)]
    Algebra(#[from] UnitError),
}

pub fn parse_unit(expr: &str, registry: &Registry) -> Result<Unit, ParseError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parts = split_top_level(expr).into_iter();
    let numerator = parse_part(parts.next().unwrap_or_default(), registry)?;
    parts.try_fold(numerator, |acc, part| {
        Ok(acc.divide(&parse_part(part, registry)?)?)
    })
}

/// Split on `/` outside parentheses, so `m^(1/2)/s` has two parts.
fn split_top_level(expr: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in expr.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                parts.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&expr[start..]);
    parts
}

fn parse_part(part: &str, registry: &Registry) -> Result<Unit, ParseError> {
    let mut part = part.trim();
    while let Some(inner) = part.strip_prefix('(').and_then(|p| p.strip_suffix(')')) {
        part = inner.trim();
    }
    if part.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut unit = Unit::ONE;
    for token in part.split(['·', '*']) {
        unit = unit.multiply(&parse_factor(token.trim(), registry)?)?;
    }
    Ok(unit)
}

fn parse_factor(token: &str, registry: &Registry) -> Result<Unit, ParseError> {
    if token.is_empty() {
        return Err(ParseError::Empty);
    }
    let (symbol, exponent) = match token.split_once('^') {
        Some((symbol, exponent)) => (symbol.trim(), Some(exponent.trim())),
        None => (token, None),
    };
    let base = if symbol == "1" {
        Unit::ONE
    } else {
        registry
            .lookup(symbol)
            .ok_or_else(|| ParseError::UnknownUnit(symbol.to_string()))?
    };
    let Some(exponent) = exponent else {
        return Ok(base);
    };
    let invalid = || ParseError::InvalidExponent(exponent.to_string());
    let fraction = exponent
        .strip_prefix('(')
        .and_then(|e| e.strip_suffix(')'))
        .unwrap_or(exponent);
    let (pow, root) = match fraction.split_once('/') {
        Some((pow, root)) => (pow.trim(), root.trim()),
        None => (fraction, "1"),
    };
    let pow: i32 = pow.parse().map_err(|_| invalid())?;
    let root: i32 = root.parse().map_err(|_| invalid())?;
    if root == 0 {
        return Err(invalid());
    }
    Ok(base.pow(pow)?.root(root)?)
}
