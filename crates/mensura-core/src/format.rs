//! Human-readable rendering of units, dimensions and converters.
//!
//! Products render as `num/den` with `·` between factors, for example
//! `kg·m^2/s^2` or `1/(m·s)`. Transformed units scaled by a power of ten over
//! a symbolic parent render with an SI prefix (`km`, `mg`); other transformed
//! units show their parent followed by the operation (`K+273.15`).

use std::fmt;

use num_traits::One;

use crate::converter::{Converter, RationalConverter};
use crate::dimension::Dimension;
use crate::product::Factor;
use crate::si::SI_PREFIXES;
use crate::unit::{TransformedUnit, Unit};

/// Render a float without the long zero runs `Display` gives very large and
/// very small magnitudes.
pub fn fmt_float(x: f64) -> String {
    let magnitude = x.abs();
    if magnitude == 0.0 || (1e-5..1e16).contains(&magnitude) {
        format!("{x}")
    } else {
        format!("{x:e}")
    }
}

fn exponent(pow: i32, root: i32) -> String {
    match (pow, root) {
        (1, 1) => String::new(),
        (pow, 1) => format!("^{pow}"),
        (pow, root) => format!("^({pow}/{root})"),
    }
}

fn is_compound(rendered: &str) -> bool {
    rendered.contains(['·', '/', '+', '-', '[', ' '])
}

fn fmt_product<K>(factors: &[Factor<K>], name: impl Fn(&K) -> String) -> String {
    let mut num = Vec::new();
    let mut den = Vec::new();
    for factor in factors {
        let base = name(factor.base());
        let pow = factor.pow();
        if pow > 0 {
            num.push(format!("{base}{}", exponent(pow, factor.root())));
        } else {
            den.push(format!("{base}{}", exponent(-pow, factor.root())));
        }
    }
    let join = |parts: &[String]| {
        let joined = parts.join("·");
        if parts.len() > 1 {
            format!("({joined})")
        } else {
            joined
        }
    };
    match (num.is_empty(), den.is_empty()) {
        (true, true) => "1".to_string(),
        (false, true) => num.join("·"),
        (true, false) => format!("1/{}", join(&den)),
        (false, false) => format!("{}/{}", num.join("·"), join(&den)),
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.symbol() {
            return write!(f, "[{symbol}]");
        }
        let product = self.to_product();
        f.write_str(&fmt_product(product.factors(), |symbol| format!("[{symbol}]")))
    }
}

/// `10^k` for a rational that is an exact power of ten.
fn decimal_exponent(rational: &RationalConverter) -> Option<i32> {
    fn digits_after_one(n: &num_bigint::BigInt) -> Option<i32> {
        let s = n.to_string();
        let zeros = s.strip_prefix('1')?;
        zeros
            .bytes()
            .all(|b| b == b'0')
            .then(|| zeros.len() as i32)
    }
    if rational.divisor().is_one() {
        digits_after_one(rational.dividend())
    } else if rational.dividend().is_one() {
        digits_after_one(rational.divisor()).map(|k| -k)
    } else {
        None
    }
}

fn prefixed_symbol(unit: &TransformedUnit) -> Option<String> {
    let Converter::Rational(rational) = unit.converter() else {
        return None;
    };
    let mut exp = decimal_exponent(rational)?;
    let mut symbol = unit.parent().symbol()?;
    if symbol == "kg" {
        exp += 3;
        symbol = "g";
    }
    if exp == 0 {
        return Some(symbol.to_string());
    }
    SI_PREFIXES
        .iter()
        .find(|(e, _)| *e == exp)
        .map(|(_, prefix)| format!("{prefix}{symbol}"))
}

fn operation_suffix(converter: &Converter) -> String {
    match converter {
        Converter::Add(a) if a.offset() < 0.0 => fmt_float(a.offset()),
        Converter::Add(a) => format!("+{}", fmt_float(a.offset())),
        Converter::Multiply(m) => format!("·{}", fmt_float(m.factor())),
        Converter::Rational(r) if r.divisor().is_one() => format!("·{}", r.dividend()),
        Converter::Rational(r) => format!("·{}/{}", r.dividend(), r.divisor()),
        Converter::PiMultiply => "·π".to_string(),
        Converter::PiDivide => "/π".to_string(),
        other => format!("[{other}]"),
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Base(b) => f.write_str(b.symbol()),
            Unit::Alternate(a) => f.write_str(a.symbol()),
            Unit::Product(p) => f.write_str(&fmt_product(p.factors(), |unit| {
                let name = unit.to_string();
                if is_compound(&name) {
                    format!("({name})")
                } else {
                    name
                }
            })),
            Unit::Transformed(t) => {
                if let Some(symbol) = prefixed_symbol(t) {
                    return f.write_str(&symbol);
                }
                let parent = t.parent().to_string();
                let suffix = operation_suffix(t.converter());
                if is_compound(&parent) {
                    write!(f, "({parent}){suffix}")
                } else {
                    write!(f, "{parent}{suffix}")
                }
            }
            Unit::Annotated(a) => write!(f, "{}{{{}}}", a.actual(), a.annotation()),
        }
    }
}

impl Converter {
    /// This converter applied to the expression `arg`.
    fn expression(&self, arg: &str) -> String {
        match self {
            Converter::Identity => arg.to_string(),
            Converter::Add(a) if a.offset() < 0.0 => {
                format!("{arg} - {}", fmt_float(-a.offset()))
            }
            Converter::Add(a) => format!("{arg} + {}", fmt_float(a.offset())),
            Converter::Multiply(m) => format!("{arg}·{}", fmt_float(m.factor())),
            Converter::Rational(r) if r.divisor().is_one() => format!("{arg}·{}", r.dividend()),
            Converter::Rational(r) => format!("{arg}·{}/{}", r.dividend(), r.divisor()),
            Converter::Log(l) => format!("log{}({arg})", fmt_float(l.base())),
            Converter::Exp(e) => format!("{}^({arg})", fmt_float(e.base())),
            Converter::PiMultiply => format!("{arg}·π"),
            Converter::PiDivide => format!("{arg}/π"),
            Converter::Compound(c) => {
                let inner = c.right().expression(arg);
                let inner = if inner.contains(' ') {
                    format!("({inner})")
                } else {
                    inner
                };
                c.left().expression(&inner)
            }
        }
    }
}

impl fmt::Display for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression("x"))
    }
}
