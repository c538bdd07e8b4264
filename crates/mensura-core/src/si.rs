//! SI base units, named derived units, prefixes and common non-SI units.

use num_bigint::BigInt;
use num_rational::BigRational;
use once_cell::sync::Lazy;

use crate::converter::Converter;
use crate::dimension::Dimension;
use crate::error::Result;
use crate::numeric::pow10;
use crate::unit::Unit;

/// SI prefixes from largest to smallest. Two-letter prefixes precede any
/// one-letter prefix they start with.
pub const SI_PREFIXES: [(i32, &str); 20] = [
    (24, "Y"),
    (21, "Z"),
    (18, "E"),
    (15, "P"),
    (12, "T"),
    (9, "G"),
    (6, "M"),
    (3, "k"),
    (2, "h"),
    (1, "da"),
    (-1, "d"),
    (-2, "c"),
    (-3, "m"),
    (-6, "µ"),
    (-9, "n"),
    (-12, "p"),
    (-15, "f"),
    (-18, "a"),
    (-21, "z"),
    (-24, "y"),
];

/// The decimal exponent of a prefix symbol. `u` is accepted for micro.
pub fn prefix_exponent(prefix: &str) -> Option<i32> {
    if prefix == "u" {
        return Some(-6);
    }
    SI_PREFIXES
        .iter()
        .find(|(_, symbol)| *symbol == prefix)
        .map(|(exp, _)| *exp)
}

fn ten_to(exponent: i32) -> Converter {
    let magnitude = pow10(exponent.unsigned_abs());
    if exponent >= 0 {
        Converter::scale(BigRational::from_integer(magnitude))
    } else {
        Converter::scale(BigRational::new(BigInt::from(1), magnitude))
    }
}

/// `unit` scaled by `10^exponent`: `prefixed(&METRE, 3)` is the kilometre.
pub fn prefixed(unit: &Unit, exponent: i32) -> Result<Unit> {
    unit.transform(ten_to(exponent))
}

fn ratio(numer: u64, denom: u64) -> Converter {
    Converter::scale(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
}

/// A system unit built from small catalogue exponents, which cannot overflow.
fn system(build: impl FnOnce() -> Result<Unit>) -> Unit {
    build().expect("catalogue exponents fit an i32")
}

fn derived(symbol: &str, build: impl FnOnce() -> Result<Unit>) -> Unit {
    Unit::alternate_of(&system(build), symbol)
}

pub static METRE: Lazy<Unit> = Lazy::new(|| Unit::base("m", Dimension::LENGTH));
pub static KILOGRAM: Lazy<Unit> = Lazy::new(|| Unit::base("kg", Dimension::MASS));
pub static SECOND: Lazy<Unit> = Lazy::new(|| Unit::base("s", Dimension::TIME));
pub static AMPERE: Lazy<Unit> = Lazy::new(|| Unit::base("A", Dimension::ELECTRIC_CURRENT));
pub static KELVIN: Lazy<Unit> = Lazy::new(|| Unit::base("K", Dimension::TEMPERATURE));
pub static MOLE: Lazy<Unit> = Lazy::new(|| Unit::base("mol", Dimension::AMOUNT_OF_SUBSTANCE));
pub static CANDELA: Lazy<Unit> = Lazy::new(|| Unit::base("cd", Dimension::LUMINOUS_INTENSITY));

pub static RADIAN: Lazy<Unit> = Lazy::new(|| derived("rad", || METRE.divide(&METRE)));
pub static STERADIAN: Lazy<Unit> =
    Lazy::new(|| derived("sr", || METRE.pow(2)?.divide(&METRE.pow(2)?)));
pub static HERTZ: Lazy<Unit> = Lazy::new(|| derived("Hz", || SECOND.inverse()));
pub static NEWTON: Lazy<Unit> = Lazy::new(|| {
    derived("N", || {
        KILOGRAM.multiply(&METRE)?.divide(&SECOND.pow(2)?)
    })
});
pub static PASCAL: Lazy<Unit> =
    Lazy::new(|| derived("Pa", || NEWTON.divide(&METRE.pow(2)?)));
pub static JOULE: Lazy<Unit> = Lazy::new(|| derived("J", || NEWTON.multiply(&METRE)));
pub static WATT: Lazy<Unit> = Lazy::new(|| derived("W", || JOULE.divide(&SECOND)));
pub static COULOMB: Lazy<Unit> = Lazy::new(|| derived("C", || SECOND.multiply(&AMPERE)));
pub static VOLT: Lazy<Unit> = Lazy::new(|| derived("V", || WATT.divide(&AMPERE)));
pub static FARAD: Lazy<Unit> = Lazy::new(|| derived("F", || COULOMB.divide(&VOLT)));
pub static OHM: Lazy<Unit> = Lazy::new(|| derived("Ω", || VOLT.divide(&AMPERE)));
pub static SIEMENS: Lazy<Unit> = Lazy::new(|| derived("S", || AMPERE.divide(&VOLT)));
pub static WEBER: Lazy<Unit> = Lazy::new(|| derived("Wb", || VOLT.multiply(&SECOND)));
pub static TESLA: Lazy<Unit> = Lazy::new(|| derived("T", || WEBER.divide(&METRE.pow(2)?)));
pub static HENRY: Lazy<Unit> = Lazy::new(|| derived("H", || WEBER.divide(&AMPERE)));
pub static LUMEN: Lazy<Unit> = Lazy::new(|| derived("lm", || CANDELA.multiply(&STERADIAN)));
pub static LUX: Lazy<Unit> = Lazy::new(|| derived("lx", || LUMEN.divide(&METRE.pow(2)?)));
pub static BECQUEREL: Lazy<Unit> = Lazy::new(|| derived("Bq", || SECOND.inverse()));
pub static GRAY: Lazy<Unit> = Lazy::new(|| derived("Gy", || JOULE.divide(&KILOGRAM)));
pub static SIEVERT: Lazy<Unit> = Lazy::new(|| derived("Sv", || JOULE.divide(&KILOGRAM)));
pub static KATAL: Lazy<Unit> = Lazy::new(|| derived("kat", || MOLE.divide(&SECOND)));

pub static GRAM: Lazy<Unit> = Lazy::new(|| Unit::transformed_of(&KILOGRAM, ratio(1, 1000)));
pub static KILOMETRE: Lazy<Unit> = Lazy::new(|| Unit::transformed_of(&METRE, ratio(1000, 1)));
pub static CENTIMETRE: Lazy<Unit> = Lazy::new(|| Unit::transformed_of(&METRE, ratio(1, 100)));
pub static MILLIMETRE: Lazy<Unit> = Lazy::new(|| Unit::transformed_of(&METRE, ratio(1, 1000)));
pub static MINUTE: Lazy<Unit> = Lazy::new(|| Unit::transformed_of(&SECOND, ratio(60, 1)));
pub static HOUR: Lazy<Unit> = Lazy::new(|| Unit::transformed_of(&SECOND, ratio(3600, 1)));
pub static DAY: Lazy<Unit> = Lazy::new(|| Unit::transformed_of(&SECOND, ratio(86_400, 1)));
pub static LITRE: Lazy<Unit> =
    Lazy::new(|| Unit::transformed_of(&system(|| METRE.pow(3)), ratio(1, 1000)));
pub static KILOMETRE_PER_HOUR: Lazy<Unit> =
    Lazy::new(|| Unit::transformed_of(&system(|| METRE.divide(&SECOND)), ratio(5, 18)));

/// `x °C = (x + 273.15) K`
pub static CELSIUS: Lazy<Unit> = Lazy::new(|| {
    Unit::transformed_of(
        &KELVIN,
        Converter::add(273.15).expect("273.15 is a finite non-zero offset"),
    )
});
/// `x °F = (x + 459.67) · 5/9 K`
pub static FAHRENHEIT: Lazy<Unit> = Lazy::new(|| {
    let rankine_offset = Converter::add(459.67).expect("459.67 is a finite non-zero offset");
    Unit::transformed_of(&KELVIN, ratio(5, 9).concatenate(&rankine_offset))
});
/// Plane angle: `π/180 rad`.
pub static DEGREE_ANGLE: Lazy<Unit> = Lazy::new(|| {
    Unit::transformed_of(&RADIAN, Converter::PiMultiply.concatenate(&ratio(1, 180)))
});
/// `1.602176634e-19 J`
pub static ELECTRON_VOLT: Lazy<Unit> = Lazy::new(|| {
    Unit::transformed_of(
        &JOULE,
        Converter::scale(BigRational::new(
            BigInt::from(1_602_176_634u64),
            pow10(28),
        )),
    )
});
pub static INCH: Lazy<Unit> = Lazy::new(|| Unit::transformed_of(&METRE, ratio(127, 5000)));
pub static FOOT: Lazy<Unit> = Lazy::new(|| Unit::transformed_of(&METRE, ratio(3048, 10_000)));
pub static MILE: Lazy<Unit> = Lazy::new(|| Unit::transformed_of(&METRE, ratio(1_609_344, 1000)));
pub static POUND: Lazy<Unit> =
    Lazy::new(|| Unit::transformed_of(&KILOGRAM, ratio(45_359_237, 100_000_000)));
pub static PERCENT: Lazy<Unit> = Lazy::new(|| Unit::transformed_of(&Unit::ONE, ratio(1, 100)));
/// Power ratio in decibels: `x dB = 10^(x/10)`.
pub static DECIBEL: Lazy<Unit> = Lazy::new(|| {
    let exp = Converter::exp(10.0).expect("10 is a valid exponential base");
    Unit::transformed_of(&Unit::ONE, exp.concatenate(&ratio(1, 10)))
});

/// Every named unit with the symbol it is written with.
pub static CATALOGUE: Lazy<Vec<(&'static str, &'static Unit)>> = Lazy::new(|| {
    vec![
        ("m", &*METRE),
        ("kg", &*KILOGRAM),
        ("s", &*SECOND),
        ("A", &*AMPERE),
        ("K", &*KELVIN),
        ("mol", &*MOLE),
        ("cd", &*CANDELA),
        ("rad", &*RADIAN),
        ("sr", &*STERADIAN),
        ("Hz", &*HERTZ),
        ("N", &*NEWTON),
        ("Pa", &*PASCAL),
        ("J", &*JOULE),
        ("W", &*WATT),
        ("C", &*COULOMB),
        ("V", &*VOLT),
        ("F", &*FARAD),
        ("Ω", &*OHM),
        ("S", &*SIEMENS),
        ("Wb", &*WEBER),
        ("T", &*TESLA),
        ("H", &*HENRY),
        ("lm", &*LUMEN),
        ("lx", &*LUX),
        ("Bq", &*BECQUEREL),
        ("Gy", &*GRAY),
        ("Sv", &*SIEVERT),
        ("kat", &*KATAL),
        ("g", &*GRAM),
        ("min", &*MINUTE),
        ("h", &*HOUR),
        ("d", &*DAY),
        ("L", &*LITRE),
        ("°C", &*CELSIUS),
        ("°F", &*FAHRENHEIT),
        ("°", &*DEGREE_ANGLE),
        ("eV", &*ELECTRON_VOLT),
        ("in", &*INCH),
        ("ft", &*FOOT),
        ("mi", &*MILE),
        ("lb", &*POUND),
        ("%", &*PERCENT),
        ("dB", &*DECIBEL),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_units_keep_their_dimension() -> Result<()> {
        let energy = Dimension::MASS
            .multiply(&Dimension::LENGTH.pow(2)?)?
            .divide(&Dimension::TIME.pow(2)?)?;
        assert_eq!(JOULE.dimension()?, energy);
        assert_eq!(RADIAN.dimension()?, Dimension::NONE);
        assert_eq!(
            OHM.to_system_unit()?.dimension()?,
            VOLT.divide(&AMPERE)?.dimension()?
        );
        assert_eq!(LITRE.to_system_unit()?, METRE.pow(3)?);
        Ok(())
    }

    #[test]
    fn alternates_are_distinct_system_units() {
        assert!(HERTZ.is_system_unit());
        assert_ne!(*HERTZ, *BECQUEREL);
        assert_eq!(HERTZ.dimension().unwrap(), BECQUEREL.dimension().unwrap());
        assert_ne!(*RADIAN, Unit::ONE);
    }

    #[test]
    fn prefixes_scale_by_powers_of_ten() {
        assert_eq!(prefixed(&METRE, 3).unwrap(), *KILOMETRE);
        assert_eq!(prefixed(&KILOGRAM, -3).unwrap(), *GRAM);
        assert_eq!(prefix_exponent("da"), Some(1));
        assert_eq!(prefix_exponent("u"), prefix_exponent("µ"));
        assert_eq!(prefix_exponent("x"), None);
    }

    #[test]
    fn catalogue_symbols_are_unique() {
        let mut symbols: Vec<_> = CATALOGUE.iter().map(|(s, _)| *s).collect();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), CATALOGUE.len());
    }
}
