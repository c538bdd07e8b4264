//! Boundary to the arbitrary-precision numeric layer.
//!
//! Exact converter arithmetic runs on [`BigRational`] and is rendered back to
//! a [`Decimal`] with a caller-selected [`Precision`]. Floats enter the exact
//! path through their shortest decimal representation, so `0.1` is the
//! rational `1/10` and not the binary approximation stored in the `f64`.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use rust_decimal::Decimal;

use crate::error::{Result, UnitError};

/// Largest scale a [`Decimal`] can carry.
const MAX_SCALE: u32 = 28;

/// Precision requested from an exact conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Precision {
    /// The result must be exact. Non-terminating expansions are rejected.
    #[default]
    Unlimited,
    /// Round the result half-even to this many significant digits.
    Digits(u32),
}

impl Precision {
    /// Every digit a [`Decimal`] can hold.
    pub const DECIMAL: Precision = Precision::Digits(MAX_SCALE);

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Precision::Unlimited)
    }
}

#[inline]
pub(crate) fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u8).pow(exp)
}

/// The exact rational value of a decimal.
pub fn decimal_to_rational(value: Decimal) -> BigRational {
    BigRational::new(BigInt::from(value.mantissa()), pow10(value.scale()))
}

/// The rational a float's shortest round-trip representation denotes.
pub fn float_to_rational(value: f64) -> Result<BigRational> {
    if !value.is_finite() {
        return Err(UnitError::arithmetic(format!(
            "{value} has no exact decimal value"
        )));
    }
    let repr = format!("{value:e}");
    let (mantissa, exponent) = repr
        .split_once('e')
        .ok_or_else(|| UnitError::arithmetic(format!("unexpected float form '{repr}'")))?;
    let exponent: i64 = exponent
        .parse()
        .map_err(|_| UnitError::arithmetic(format!("unexpected float exponent in '{repr}'")))?;
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits: BigInt = format!("{int_part}{frac_part}")
        .parse()
        .map_err(|_| UnitError::arithmetic(format!("unexpected float digits in '{repr}'")))?;

    let exponent = exponent - frac_part.len() as i64;
    let magnitude = pow10(exponent.unsigned_abs() as u32);
    Ok(if exponent >= 0 {
        BigRational::from_integer(digits * magnitude)
    } else {
        BigRational::new(digits, magnitude)
    })
}

/// Render a rational as a decimal honouring `precision`.
pub fn rational_to_decimal(value: &BigRational, precision: Precision) -> Result<Decimal> {
    let numer = value.numer();
    let denom = value.denom();
    match precision {
        Precision::Unlimited => {
            for scale in 0..=MAX_SCALE {
                let scaled = numer * pow10(scale);
                let (quotient, remainder) = scaled.div_rem(denom);
                if remainder.is_zero() {
                    return fit(quotient, scale, true);
                }
            }
            Err(UnitError::arithmetic(format!(
                "{value} has a non-terminating decimal expansion; no exact representable result"
            )))
        }
        Precision::Digits(0) => Err(UnitError::invalid(
            "precision must request at least one significant digit",
        )),
        Precision::Digits(digits) => {
            let scaled = div_round_half_even(&(numer * pow10(MAX_SCALE)), denom);
            let decimal = fit(scaled, MAX_SCALE, false)?;
            decimal
                .round_sf(digits)
                .map(|d| d.normalize())
                .ok_or_else(|| {
                    UnitError::arithmetic(format!("cannot round {decimal} to {digits} digits"))
                })
        }
    }
}

/// Float value of an exact decimal.
pub fn decimal_to_float(value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| UnitError::arithmetic(format!("{value} is not representable as f64")))
}

/// Exact decimal of a float, rounded to `precision`.
pub fn float_to_decimal(value: f64, precision: Precision) -> Result<Decimal> {
    rational_to_decimal(&float_to_rational(value)?, precision)
}

/// Shrink `mantissa · 10^-scale` until it fits the 96-bit decimal mantissa.
fn fit(mut mantissa: BigInt, mut scale: u32, exact: bool) -> Result<Decimal> {
    let ten = BigInt::from(10u8);
    while mantissa.bits() > 96 && scale > 0 {
        if exact {
            return Err(UnitError::arithmetic(
                "exact result needs more digits than a decimal can hold",
            ));
        }
        mantissa = div_round_half_even(&mantissa, &ten);
        scale -= 1;
    }
    let value = mantissa
        .to_i128()
        .filter(|_| mantissa.bits() <= 96)
        .ok_or_else(|| UnitError::arithmetic(format!("{mantissa} overflows a decimal")))?;
    Decimal::try_from_i128_with_scale(value, scale)
        .map_err(|err| UnitError::arithmetic(err.to_string()))
}

/// `n / d` rounded half-even; `d` must be positive.
fn div_round_half_even(n: &BigInt, d: &BigInt) -> BigInt {
    let (quotient, remainder) = n.div_rem(d);
    let twice = remainder.abs() * 2u8;
    let away = || &quotient + n.signum();
    match twice.cmp(d) {
        Ordering::Less => quotient.clone(),
        Ordering::Greater => away(),
        Ordering::Equal if quotient.is_even() => quotient.clone(),
        Ordering::Equal => away(),
    }
}
