//! The unit model.
//!
//! A [`Unit`] is one of five variants:
//!
//! * [`BaseUnit`] – an atomic system unit with its own symbol and dimension.
//! * [`AlternateUnit`] – a distinctly named system unit standing for another
//!   system unit of the same dimension (`J` for `kg·m²/s²`).
//! * [`ProductUnit`] – a canonical product of rational powers of bare units.
//! * [`TransformedUnit`] – a non-system unit: a system parent plus the
//!   converter from the unit to that parent.
//! * [`AnnotatedUnit`] – any unit with an opaque label attached.
//!
//! Units are immutable values. Products are canonicalised on construction: a
//! product with no factors is [`Unit::ONE`] and a product with one plain
//! factor is that factor itself.

use std::sync::Arc;

use num_traits::Zero;

use crate::converter::Converter;
use crate::dimension::Dimension;
use crate::error::{Result, UnitError};
use crate::model::{self, DimensionalModel};
use crate::numeric;
use crate::product::{Factor, Product};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    Base(BaseUnit),
    Alternate(AlternateUnit),
    Product(ProductUnit),
    Transformed(TransformedUnit),
    Annotated(AnnotatedUnit),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUnit {
    symbol: Arc<str>,
    dimension: Dimension,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlternateUnit {
    symbol: Arc<str>,
    parent: Arc<Unit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductUnit {
    factors: Product<Unit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformedUnit {
    parent: Arc<Unit>,
    converter: Converter,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnnotatedUnit {
    actual: Arc<Unit>,
    annotation: Arc<str>,
}

impl BaseUnit {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }
}

impl AlternateUnit {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The system unit this unit stands for.
    pub fn parent(&self) -> &Unit {
        &self.parent
    }
}

impl ProductUnit {
    pub fn factors(&self) -> &[Factor<Unit>] {
        self.factors.factors()
    }
}

impl TransformedUnit {
    /// Always a system unit.
    pub fn parent(&self) -> &Unit {
        &self.parent
    }

    /// Converts values of this unit into values of [`TransformedUnit::parent`].
    pub fn converter(&self) -> &Converter {
        &self.converter
    }
}

impl AnnotatedUnit {
    /// Never itself annotated.
    pub fn actual(&self) -> &Unit {
        &self.actual
    }

    pub fn annotation(&self) -> &str {
        &self.annotation
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::ONE
    }
}

impl Unit {
    /// The dimensionless unit: the empty product.
    pub const ONE: Unit = Unit::Product(ProductUnit {
        factors: Product::empty(),
    });

    pub fn base(symbol: impl Into<Arc<str>>, dimension: Dimension) -> Unit {
        Unit::Base(BaseUnit {
            symbol: symbol.into(),
            dimension,
        })
    }

    /// A new system unit named `symbol` standing for this system unit.
    pub fn alternate(&self, symbol: impl Into<Arc<str>>) -> Result<Unit> {
        if !self.is_system_unit() {
            return Err(UnitError::invalid(format!(
                "{self} is not a system unit, it cannot parent an alternate unit"
            )));
        }
        Ok(Unit::alternate_of(self, symbol))
    }

    pub(crate) fn alternate_of(parent: &Unit, symbol: impl Into<Arc<str>>) -> Unit {
        debug_assert!(parent.is_system_unit());
        Unit::Alternate(AlternateUnit {
            symbol: symbol.into(),
            parent: Arc::new(parent.clone()),
        })
    }

    /// A unit whose values `converter` maps into values of the system unit
    /// `parent`. An identity converter yields `parent` itself.
    pub fn transformed(parent: &Unit, converter: Converter) -> Result<Unit> {
        if !parent.is_system_unit() {
            return Err(UnitError::invalid(format!(
                "{parent} is not a system unit, it cannot parent a transformed unit"
            )));
        }
        Ok(Unit::transformed_of(parent, converter))
    }

    pub(crate) fn transformed_of(parent: &Unit, converter: Converter) -> Unit {
        debug_assert!(parent.is_system_unit());
        if converter.is_identity() {
            return parent.clone();
        }
        Unit::Transformed(TransformedUnit {
            parent: Arc::new(parent.clone()),
            converter,
        })
    }

    /// The unit whose values `operation` maps into values of this unit.
    ///
    /// The result is rooted at this unit's system unit, so transforming a
    /// transformed unit composes the converters instead of nesting units.
    pub fn transform(&self, operation: Converter) -> Result<Unit> {
        if operation.is_identity() {
            return Ok(self.clone());
        }
        let system = self.to_system_unit()?;
        let converter = self.converter_to_system_unit()?.concatenate(&operation);
        Ok(Unit::transformed_of(&system, converter))
    }

    /// `self + offset`: a value `x` of the result is `x + offset` of `self`.
    pub fn shift(&self, offset: f64) -> Result<Unit> {
        self.transform(Converter::add(offset)?)
    }

    /// `self · factor`, with `factor` taken at its shortest decimal value
    /// and kept exact, so `times(0.1)` scales by exactly `1/10`.
    pub fn times(&self, factor: f64) -> Result<Unit> {
        let ratio = numeric::float_to_rational(factor)
            .map_err(|_| UnitError::invalid(format!("factor must be finite, got {factor}")))?;
        if ratio.is_zero() {
            return Err(UnitError::invalid("factor 0 is not invertible"));
        }
        self.transform(Converter::scale(ratio))
    }

    /// `self · dividend / divisor`, kept exact.
    pub fn times_ratio(&self, dividend: i64, divisor: i64) -> Result<Unit> {
        self.transform(Converter::rational(dividend, divisor)?)
    }

    /// `self / divisor`, kept exact.
    pub fn divided_by(&self, divisor: i64) -> Result<Unit> {
        self.times_ratio(1, divisor)
    }

    /// Attach `annotation` to this unit. Annotating an annotated unit
    /// replaces the label rather than nesting wrappers.
    pub fn annotate(&self, annotation: impl Into<Arc<str>>) -> Unit {
        let actual = match self {
            Unit::Annotated(a) => a.actual.clone(),
            other => Arc::new(other.clone()),
        };
        Unit::Annotated(AnnotatedUnit {
            actual,
            annotation: annotation.into(),
        })
    }

    fn to_product(&self) -> Product<Unit> {
        match self {
            Unit::Product(p) => p.factors.clone(),
            other => Product::single(other.clone()),
        }
    }

    fn from_product(product: Product<Unit>) -> Unit {
        match product.into_single() {
            Ok(unit) => unit,
            Err(factors) => Unit::Product(ProductUnit { factors }),
        }
    }

    /// Exponents that overflow an `i32` are an arithmetic error here and in
    /// every other operation of the unit algebra.
    pub fn multiply(&self, other: &Unit) -> Result<Unit> {
        Ok(Unit::from_product(self.to_product().multiply(&other.to_product())?))
    }

    pub fn divide(&self, other: &Unit) -> Result<Unit> {
        let inverse = other.to_product().invert()?;
        Ok(Unit::from_product(self.to_product().multiply(&inverse)?))
    }

    pub fn inverse(&self) -> Result<Unit> {
        Ok(Unit::from_product(self.to_product().invert()?))
    }

    pub fn pow(&self, n: i32) -> Result<Unit> {
        Ok(Unit::from_product(self.to_product().pow(n)?))
    }

    /// Also fails when `n` is zero.
    pub fn root(&self, n: i32) -> Result<Unit> {
        Ok(Unit::from_product(self.to_product().root(n)?))
    }

    fn raise(&self, pow: i32, root: i32) -> Result<Unit> {
        Ok(Unit::from_product(
            self.to_product().raise(i64::from(pow), i64::from(root))?,
        ))
    }

    /// The symbol of a base or alternate unit, seen through annotations.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Unit::Base(b) => Some(&b.symbol),
            Unit::Alternate(a) => Some(&a.symbol),
            Unit::Annotated(a) => a.actual.symbol(),
            Unit::Product(_) | Unit::Transformed(_) => None,
        }
    }

    /// Fails only when the exponents of a product's dimension overflow.
    pub fn dimension(&self) -> Result<Dimension> {
        match self {
            Unit::Base(b) => Ok(b.dimension.clone()),
            Unit::Alternate(a) => a.parent.dimension(),
            Unit::Product(p) => p.factors().iter().try_fold(Dimension::NONE, |acc, f| {
                acc.multiply(&f.base().dimension()?.raise(f.pow(), f.root())?)
            }),
            Unit::Transformed(t) => t.parent.dimension(),
            Unit::Annotated(a) => a.actual.dimension(),
        }
    }

    /// The factors of a product unit (empty for [`Unit::ONE`]), seen through
    /// annotations; `None` for every other unit.
    pub fn product_elements(&self) -> Option<&[Factor<Unit>]> {
        match self {
            Unit::Product(p) => Some(p.factors()),
            Unit::Annotated(a) => a.actual.product_elements(),
            Unit::Base(_) | Unit::Alternate(_) | Unit::Transformed(_) => None,
        }
    }

    pub fn is_system_unit(&self) -> bool {
        match self {
            Unit::Base(_) | Unit::Alternate(_) => true,
            Unit::Product(p) => p.factors().iter().all(|f| f.base().is_system_unit()),
            Unit::Transformed(_) | Unit::Annotated(_) => false,
        }
    }

    /// The unscaled reference unit of this unit's dimension.
    pub fn to_system_unit(&self) -> Result<Unit> {
        match self {
            Unit::Base(_) | Unit::Alternate(_) => Ok(self.clone()),
            Unit::Product(p) if self.is_system_unit() => Ok(Unit::Product(p.clone())),
            Unit::Product(p) => p.factors().iter().try_fold(Unit::ONE, |acc, f| {
                acc.multiply(&f.base().to_system_unit()?.raise(f.pow(), f.root())?)
            }),
            Unit::Transformed(t) => Ok((*t.parent).clone()),
            Unit::Annotated(a) => a.actual.to_system_unit(),
        }
    }

    /// The converter from this unit to [`Unit::to_system_unit`].
    ///
    /// A product composes its factors' converters raised to their powers.
    /// That composition is only defined for linear converters applied with
    /// integer exponents; anything else is an unsupported operation.
    pub fn converter_to_system_unit(&self) -> Result<Converter> {
        match self {
            Unit::Base(_) | Unit::Alternate(_) => Ok(Converter::Identity),
            Unit::Transformed(t) => Ok(t.converter.clone()),
            Unit::Annotated(a) => a.actual.converter_to_system_unit(),
            Unit::Product(p) => {
                let mut converter = Converter::Identity;
                for factor in p.factors() {
                    let step = factor.base().converter_to_system_unit()?;
                    if step.is_identity() {
                        continue;
                    }
                    if !step.is_linear() {
                        return Err(UnitError::unsupported(format!(
                            "{} is non-linear, cannot convert",
                            factor.base()
                        )));
                    }
                    if factor.root() != 1 {
                        return Err(UnitError::unsupported(format!(
                            "{} holds a base unit with fractional exponent",
                            self
                        )));
                    }
                    converter = converter.concatenate(&step.pow(factor.pow()));
                }
                log::trace!("converter from {self} to system unit: {converter}");
                Ok(converter)
            }
        }
    }

    /// Converter from this unit to `target` under the active dimensional model.
    pub fn converter_to(&self, target: &Unit) -> Result<Converter> {
        self.converter_to_in(target, model::current())
    }

    /// Converter from this unit to `target` under `model`.
    pub fn converter_to_in(&self, target: &Unit, model: &DimensionalModel) -> Result<Converter> {
        if self == target {
            return Ok(Converter::Identity);
        }
        if self.to_system_unit()? != target.to_system_unit()? {
            return model.converter_between(self, target);
        }
        let this_to_system = self.converter_to_system_unit()?;
        let target_to_system = target.converter_to_system_unit()?;
        Ok(target_to_system.inverse().concatenate(&this_to_system))
    }

    /// Converter to `target` across dimensions the active model declares
    /// commensurable.
    pub fn converter_to_any(&self, target: &Unit) -> Result<Converter> {
        self.converter_to_any_in(target, model::current())
    }

    pub fn converter_to_any_in(&self, target: &Unit, model: &DimensionalModel) -> Result<Converter> {
        model.converter_between(self, target)
    }

    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.is_compatible_in(other, model::current())
    }

    /// True if both units share a dimension, or `model` reduces their
    /// dimensions to the same fundamental dimension. Units whose dimension
    /// cannot be computed are compatible with nothing.
    pub fn is_compatible_in(&self, other: &Unit, model: &DimensionalModel) -> bool {
        let compatible = || -> Result<bool> {
            let (this, that) = (self.dimension()?, other.dimension()?);
            Ok(this == that
                || model.fundamental_dimension(&this)? == model.fundamental_dimension(&that)?)
        };
        compatible().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metre() -> Unit {
        Unit::base("m", Dimension::LENGTH)
    }

    fn second() -> Unit {
        Unit::base("s", Dimension::TIME)
    }

    fn kilogram() -> Unit {
        Unit::base("kg", Dimension::MASS)
    }

    #[test]
    fn pow_then_root_returns_bare_unit() {
        let m = metre();
        let back = m.pow(2).unwrap().root(2).unwrap();
        assert_eq!(back, m);
        assert!(matches!(back, Unit::Base(_)));
    }

    #[test]
    fn canonical_form_is_association_independent() -> Result<()> {
        let (a, b) = (metre(), second());
        assert_eq!(a.multiply(&b)?.divide(&a)?, b);
        assert_eq!(a.multiply(&b)?, b.multiply(&a)?);
        let left = a.multiply(&b)?.multiply(&kilogram())?;
        let right = a.multiply(&b.multiply(&kilogram())?)?;
        assert_eq!(left, right);
        Ok(())
    }

    #[test]
    fn one_is_absorbing() -> Result<()> {
        let m = metre();
        assert_eq!(Unit::ONE.multiply(&m)?, m);
        assert_eq!(m.multiply(&Unit::ONE)?, m);
        assert_eq!(m.divide(&m)?, Unit::ONE);
        assert_eq!(m.pow(0)?, Unit::ONE);
        assert_eq!(Unit::ONE.product_elements(), Some(&[][..]));
        Ok(())
    }

    #[test]
    fn product_elements_expose_rational_exponents() {
        let speed = metre().divide(&second().root(2).unwrap()).unwrap();
        let factors = speed.product_elements().unwrap();
        assert_eq!(factors.len(), 2);
        assert_eq!(factors[1].base(), &second());
        assert_eq!((factors[1].pow(), factors[1].root()), (-1, 2));
        assert_eq!(metre().product_elements(), None);
    }

    #[test]
    fn root_of_order_zero_fails() {
        assert!(matches!(metre().root(0), Err(UnitError::Arithmetic(_))));
    }

    #[test]
    fn exponent_overflow_is_an_arithmetic_error() {
        let huge = metre().pow(i32::MAX).unwrap();
        assert!(matches!(huge.multiply(&metre()), Err(UnitError::Arithmetic(_))));
        assert!(matches!(
            metre().pow(i32::MIN).unwrap().inverse(),
            Err(UnitError::Arithmetic(_))
        ));

        // Each factor fits, but the dimension of the product does not.
        let litre = metre()
            .pow(3)
            .and_then(|cube| Unit::transformed(&cube, Converter::rational(1, 1000)?))
            .unwrap();
        let big = litre.pow(i32::MAX).unwrap();
        assert!(matches!(big.dimension(), Err(UnitError::Arithmetic(_))));
        assert!(matches!(big.to_system_unit(), Err(UnitError::Arithmetic(_))));
        assert!(!big.is_compatible(&metre()));
    }

    #[test]
    fn dimensions_follow_the_algebra() -> Result<()> {
        let acceleration = metre().divide(&second().pow(2)?)?;
        assert_eq!(
            acceleration.dimension()?,
            Dimension::LENGTH.divide(&Dimension::TIME.pow(2)?)?
        );
        let km = metre().times_ratio(1000, 1)?;
        assert_eq!(km.dimension()?, Dimension::LENGTH);
        assert_eq!(Unit::ONE.dimension()?, Dimension::NONE);
        Ok(())
    }

    #[test]
    fn alternates_require_system_parents() {
        let joule = kilogram()
            .multiply(&metre().pow(2).unwrap())
            .and_then(|u| u.divide(&second().pow(2)?))
            .and_then(|u| u.alternate("J"))
            .unwrap();
        assert_eq!(joule.symbol(), Some("J"));
        assert!(joule.is_system_unit());
        assert_eq!(joule.to_system_unit().unwrap(), joule);

        let km = metre().times_ratio(1000, 1).unwrap();
        assert!(matches!(km.alternate("km"), Err(UnitError::InvalidArgument(_))));
        assert!(matches!(
            Unit::transformed(&km, Converter::multiply(2.0).unwrap()),
            Err(UnitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn transform_re_roots_at_system_unit() {
        let km = metre().times_ratio(1000, 1).unwrap();
        let mm = km.divided_by(1_000_000).unwrap();
        let Unit::Transformed(inner) = &mm else {
            panic!("expected transformed unit");
        };
        assert_eq!(inner.parent(), &metre());
        assert_eq!(inner.converter(), &Converter::rational(1, 1000).unwrap());

        let back = mm.times_ratio(1000, 1).unwrap();
        assert_eq!(back, metre());
    }

    #[test]
    fn float_factors_are_kept_exact() {
        let tenth = metre().times(0.1).unwrap();
        let Unit::Transformed(inner) = &tenth else {
            panic!("expected transformed unit");
        };
        assert_eq!(inner.converter(), &Converter::rational(1, 10).unwrap());
        assert_eq!(metre().times(1.0).unwrap(), metre());
        assert!(matches!(metre().times(0.0), Err(UnitError::InvalidArgument(_))));
        assert!(matches!(
            metre().times(f64::NAN),
            Err(UnitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn float_factor_units_convert_symmetrically() {
        let units: Vec<Unit> = (2..40)
            .map(|tenths| metre().times(f64::from(tenths) / 10.0).unwrap())
            .collect();
        for a in &units {
            for b in &units {
                let forward = a.converter_to(b).unwrap();
                let backward = b.converter_to(a).unwrap();
                assert_eq!(forward.inverse(), backward, "{a} -> {b}");
            }
        }
    }

    #[test]
    fn system_unit_is_idempotent() -> Result<()> {
        let km = metre().times_ratio(1000, 1)?;
        let hour = second().times_ratio(3600, 1)?;
        let samples = [
            metre(),
            km.clone(),
            km.divide(&hour)?,
            km.annotate("road"),
            km.pow(2)?.root(3)?,
            Unit::ONE,
        ];
        for unit in samples {
            let system = unit.to_system_unit()?;
            assert_eq!(system.to_system_unit()?, system, "{unit}");
            assert!(system.is_system_unit());
        }
        assert_eq!(km.divide(&hour)?.to_system_unit()?, metre().divide(&second())?);
        Ok(())
    }

    #[test]
    fn product_converter_composes_factors() -> Result<()> {
        let km = metre().times_ratio(1000, 1)?;
        let hour = second().times_ratio(3600, 1)?;
        let kmh = km.divide(&hour)?;
        assert_eq!(kmh.converter_to_system_unit()?, Converter::rational(5, 18)?);
        assert_eq!(
            km.pow(2)?.converter_to_system_unit()?,
            Converter::rational(1_000_000, 1)?
        );
        Ok(())
    }

    #[test]
    fn fractional_exponent_of_transformed_unit_is_unsupported() {
        let km = metre().times_ratio(1000, 1).unwrap();
        let root_km = km.root(2).unwrap();
        assert!(matches!(
            root_km.converter_to_system_unit(),
            Err(UnitError::UnsupportedOperation(_))
        ));
        // fractional powers of system units need no converter
        assert_eq!(
            metre().root(2).unwrap().converter_to_system_unit().unwrap(),
            Converter::Identity
        );
    }

    #[test]
    fn annotations_flatten() {
        let m = metre();
        let peak = m.annotate("peak");
        let rms = peak.annotate("rms");
        let Unit::Annotated(inner) = &rms else {
            panic!("expected annotated unit");
        };
        assert_eq!(inner.actual(), &m);
        assert_eq!(inner.annotation(), "rms");
        assert_eq!(rms, m.annotate("rms"));
        assert_ne!(peak, rms);
        assert_ne!(peak, m);

        assert_eq!(peak.symbol(), Some("m"));
        assert_eq!(peak.dimension().unwrap(), Dimension::LENGTH);
        assert_eq!(peak.to_system_unit().unwrap(), m);
        assert_eq!(peak.converter_to(&m).unwrap(), Converter::Identity);
    }

    #[test]
    fn converters_between_same_system_units() {
        let m = metre();
        let km = m.times_ratio(1000, 1).unwrap();
        let cm = m.divided_by(100).unwrap();
        assert_eq!(km.converter_to(&km).unwrap(), Converter::Identity);
        let km_to_cm = km.converter_to(&cm).unwrap();
        assert_eq!(km_to_cm, Converter::rational(100_000, 1).unwrap());
        assert_eq!(km_to_cm.inverse(), cm.converter_to(&km).unwrap());
        assert_eq!(km_to_cm.convert(1.5), 150_000.0);
    }

    #[test]
    fn incompatible_units_fail() {
        let err = metre().converter_to(&second()).unwrap_err();
        let UnitError::Incommensurable { from, to } = err else {
            panic!("expected incommensurable error");
        };
        assert_eq!(*from, metre());
        assert_eq!(*to, second());
        assert!(!metre().is_compatible(&second()));
    }
}
