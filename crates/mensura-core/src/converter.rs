//! Immutable numeric transformations between units.
//!
//! A [`Converter`] has a floating-point path ([`Converter::convert`]) and an
//! exact decimal path ([`Converter::convert_exact`]). Identity has exactly
//! one representation: constructors reject parameters that would make any
//! other variant behave as the identity, and [`Converter::concatenate`]
//! collapses same-variant pairs back to [`Converter::Identity`] when they
//! cancel out.

use std::f64::consts::PI;
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use rust_decimal::Decimal;

use crate::error::{Result, UnitError};
use crate::numeric::{self, Precision};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Converter {
    Identity,
    /// `x + offset`
    Add(AddConverter),
    /// `x · factor`
    Multiply(MultiplyConverter),
    /// `x · dividend / divisor`
    Rational(RationalConverter),
    /// `log_base(x)`
    Log(LogConverter),
    /// `base^x`
    Exp(ExpConverter),
    /// `x · π`
    PiMultiply,
    /// `x / π`
    PiDivide,
    /// `left(right(x))`
    Compound(CompoundConverter),
}

#[derive(Debug, Clone, Copy)]
pub struct AddConverter {
    offset: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct MultiplyConverter {
    factor: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RationalConverter {
    dividend: BigInt,
    divisor: BigInt,
}

#[derive(Debug, Clone, Copy)]
pub struct LogConverter {
    base: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ExpConverter {
    base: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompoundConverter {
    left: Box<Converter>,
    right: Box<Converter>,
}

// Float-carrying converters compare and hash on the exact bit pattern.
macro_rules! float_identity {
    ($ty:ident, $field:ident) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.$field.to_bits() == other.$field.to_bits()
            }
        }

        impl Eq for $ty {}

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.$field.to_bits().hash(state);
            }
        }
    };
}

float_identity!(AddConverter, offset);
float_identity!(MultiplyConverter, factor);
float_identity!(LogConverter, base);
float_identity!(ExpConverter, base);

impl AddConverter {
    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl MultiplyConverter {
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl RationalConverter {
    pub fn dividend(&self) -> &BigInt {
        &self.dividend
    }

    /// Always positive.
    pub fn divisor(&self) -> &BigInt {
        &self.divisor
    }

    pub fn ratio(&self) -> BigRational {
        BigRational::new(self.dividend.clone(), self.divisor.clone())
    }
}

impl LogConverter {
    pub fn base(&self) -> f64 {
        self.base
    }
}

impl ExpConverter {
    pub fn base(&self) -> f64 {
        self.base
    }
}

impl CompoundConverter {
    /// Applied last.
    pub fn left(&self) -> &Converter {
        &self.left
    }

    /// Applied first.
    pub fn right(&self) -> &Converter {
        &self.right
    }
}

fn check_finite(value: f64, what: &str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(UnitError::invalid(format!("{what} must be finite, got {value}")))
    }
}

fn check_log_base(base: f64) -> Result<()> {
    check_finite(base, "logarithm base")?;
    if base <= 0.0 || base == 1.0 {
        return Err(UnitError::invalid(format!(
            "logarithm base must be positive and different from one, got {base}"
        )));
    }
    Ok(())
}

impl Converter {
    pub fn add(offset: f64) -> Result<Converter> {
        check_finite(offset, "offset")?;
        if offset == 0.0 {
            return Err(UnitError::invalid("offset 0 would result in identity converter"));
        }
        Ok(Converter::Add(AddConverter { offset }))
    }

    pub fn multiply(factor: f64) -> Result<Converter> {
        check_finite(factor, "factor")?;
        if factor == 1.0 {
            return Err(UnitError::invalid("factor 1 would result in identity converter"));
        }
        if factor == 0.0 {
            return Err(UnitError::invalid("factor 0 is not invertible"));
        }
        Ok(Converter::Multiply(MultiplyConverter { factor }))
    }

    /// `dividend / divisor`, stored reduced. The divisor must be positive.
    pub fn rational(dividend: impl Into<BigInt>, divisor: impl Into<BigInt>) -> Result<Converter> {
        let dividend = dividend.into();
        let divisor = divisor.into();
        if !divisor.is_positive() {
            return Err(UnitError::invalid(format!(
                "negative or zero divisor {divisor}"
            )));
        }
        if dividend.is_zero() {
            return Err(UnitError::invalid("zero dividend is not invertible"));
        }
        let ratio = BigRational::new(dividend, divisor);
        if ratio.is_one() {
            return Err(UnitError::invalid(
                "dividend equal to divisor would result in identity converter",
            ));
        }
        Ok(Converter::scale(ratio))
    }

    pub fn log(base: f64) -> Result<Converter> {
        check_log_base(base)?;
        Ok(Converter::Log(LogConverter { base }))
    }

    pub fn exp(base: f64) -> Result<Converter> {
        check_log_base(base)?;
        Ok(Converter::Exp(ExpConverter { base }))
    }

    /// Exact scale by a non-zero ratio; a ratio of one yields Identity.
    pub(crate) fn scale(ratio: BigRational) -> Converter {
        debug_assert!(!ratio.is_zero(), "scale by zero");
        if ratio.is_one() {
            return Converter::Identity;
        }
        let (dividend, divisor) = ratio.into_raw();
        Converter::Rational(RationalConverter { dividend, divisor })
    }

    fn from_factor(factor: f64) -> Converter {
        if factor == 1.0 {
            Converter::Identity
        } else {
            Converter::Multiply(MultiplyConverter { factor })
        }
    }

    fn from_offset(offset: f64) -> Converter {
        if offset == 0.0 {
            Converter::Identity
        } else {
            Converter::Add(AddConverter { offset })
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Converter::Identity)
    }

    /// Whether the converter is an affine or rational scale, closed under
    /// composition and usable on the exact path without precision loss.
    pub fn is_linear(&self) -> bool {
        match self {
            Converter::Identity
            | Converter::Add(_)
            | Converter::Multiply(_)
            | Converter::Rational(_)
            | Converter::PiMultiply
            | Converter::PiDivide => true,
            Converter::Log(_) | Converter::Exp(_) => false,
            Converter::Compound(c) => c.left.is_linear() && c.right.is_linear(),
        }
    }

    pub fn inverse(&self) -> Converter {
        match self {
            Converter::Identity => Converter::Identity,
            Converter::Add(a) => Converter::from_offset(-a.offset),
            Converter::Multiply(m) => Converter::from_factor(1.0 / m.factor),
            Converter::Rational(r) => {
                let (dividend, divisor) = if r.dividend.is_negative() {
                    (-&r.divisor, -&r.dividend)
                } else {
                    (r.divisor.clone(), r.dividend.clone())
                };
                Converter::Rational(RationalConverter { dividend, divisor })
            }
            Converter::Log(l) => Converter::Exp(ExpConverter { base: l.base }),
            Converter::Exp(e) => Converter::Log(LogConverter { base: e.base }),
            Converter::PiMultiply => Converter::PiDivide,
            Converter::PiDivide => Converter::PiMultiply,
            Converter::Compound(c) => Converter::Compound(CompoundConverter {
                left: Box::new(c.right.inverse()),
                right: Box::new(c.left.inverse()),
            }),
        }
    }

    /// The converter applying `other` first and then `self`.
    pub fn concatenate(&self, other: &Converter) -> Converter {
        match (self, other) {
            (Converter::Identity, c) | (c, Converter::Identity) => c.clone(),
            (Converter::Add(a), Converter::Add(b)) => Converter::from_offset(a.offset + b.offset),
            (Converter::Multiply(a), Converter::Multiply(b)) => {
                Converter::from_factor(a.factor * b.factor)
            }
            (Converter::Rational(a), Converter::Rational(b)) => {
                Converter::scale(a.ratio() * b.ratio())
            }
            (Converter::Log(l), Converter::Exp(e)) | (Converter::Exp(e), Converter::Log(l))
                if l.base.to_bits() == e.base.to_bits() =>
            {
                Converter::Identity
            }
            (Converter::PiMultiply, Converter::PiDivide)
            | (Converter::PiDivide, Converter::PiMultiply) => Converter::Identity,
            _ => Converter::Compound(CompoundConverter {
                left: Box::new(self.clone()),
                right: Box::new(other.clone()),
            }),
        }
    }

    /// `self` concatenated `|n|` times, inverted first when `n` is negative.
    pub fn pow(&self, n: i32) -> Converter {
        let step = if n < 0 { self.inverse() } else { self.clone() };
        (0..n.unsigned_abs()).fold(Converter::Identity, |acc, _| acc.concatenate(&step))
    }

    pub fn convert(&self, value: f64) -> f64 {
        match self {
            Converter::Identity => value,
            Converter::Add(a) => value + a.offset,
            Converter::Multiply(m) => value * m.factor,
            Converter::Rational(r) => value * r.ratio().to_f64().unwrap_or(f64::NAN),
            Converter::Log(l) => value.ln() / l.base.ln(),
            Converter::Exp(e) => e.base.powf(value),
            Converter::PiMultiply => value * PI,
            Converter::PiDivide => value / PI,
            Converter::Compound(c) => c.left.convert(c.right.convert(value)),
        }
    }

    /// Convert on the exact decimal path.
    ///
    /// Linear converters are evaluated on exact rationals and rounded once
    /// to `precision`. Non-linear ones go through [`Converter::convert`] and
    /// lose whatever precision an `f64` cannot carry.
    pub fn convert_exact(&self, value: Decimal, precision: Precision) -> Result<Decimal> {
        if !self.is_linear() {
            log::debug!("{self} is non-linear, converting {value} on the float path");
            let result = self.convert(numeric::decimal_to_float(value)?);
            return numeric::float_to_decimal(result, precision);
        }
        let exact = self.apply_exact(numeric::decimal_to_rational(value), precision)?;
        numeric::rational_to_decimal(&exact, precision)
    }

    fn apply_exact(&self, value: BigRational, precision: Precision) -> Result<BigRational> {
        match self {
            Converter::Identity => Ok(value),
            Converter::Add(a) => Ok(value + numeric::float_to_rational(a.offset)?),
            Converter::Multiply(m) => Ok(value * numeric::float_to_rational(m.factor)?),
            Converter::Rational(r) => Ok(value * r.ratio()),
            Converter::PiMultiply => Ok(value * pi(precision)?),
            Converter::PiDivide => Ok(value / pi(precision)?),
            Converter::Compound(c) => {
                let inner = c.right.apply_exact(value, precision)?;
                c.left.apply_exact(inner, precision)
            }
            Converter::Log(_) | Converter::Exp(_) => Err(UnitError::unsupported(format!(
                "{self} has no exact evaluation"
            ))),
        }
    }
}

fn pi(precision: Precision) -> Result<BigRational> {
    if precision.is_unlimited() {
        return Err(UnitError::unsupported(
            "π cannot be evaluated with unlimited precision",
        ));
    }
    Ok(numeric::decimal_to_rational(Decimal::PI))
}
