//! Kinds of quantity as products of powers of fundamental dimensions.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::product::Product;

/// A fundamental dimension, or a canonical product of fundamental dimensions
/// raised to rational powers. The empty product is [`Dimension::NONE`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimension(Repr);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    Fundamental(char),
    Product(Product<char>),
}

/// Rational exponent `pow/root` of one fundamental in a product dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Exponent {
    pub pow: i32,
    pub root: i32,
}

impl Exponent {
    pub fn as_integer(&self) -> Option<i32> {
        (self.root == 1).then_some(self.pow)
    }
}

impl fmt::Display for Exponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_integer() {
            Some(pow) => write!(f, "{pow}"),
            None => write!(f, "{}/{}", self.pow, self.root),
        }
    }
}

impl Dimension {
    pub const NONE: Self = Dimension(Repr::Product(Product::empty()));
    pub const LENGTH: Self = Self::new('L');
    pub const MASS: Self = Self::new('M');
    pub const TIME: Self = Self::new('T');
    pub const ELECTRIC_CURRENT: Self = Self::new('I');
    pub const TEMPERATURE: Self = Self::new('Θ');
    pub const AMOUNT_OF_SUBSTANCE: Self = Self::new('N');
    pub const LUMINOUS_INTENSITY: Self = Self::new('J');

    /// The fundamental dimension named by `symbol`.
    pub const fn new(symbol: char) -> Self {
        Dimension(Repr::Fundamental(symbol))
    }

    fn from_product(product: Product<char>) -> Self {
        match product.into_single() {
            Ok(symbol) => Dimension(Repr::Fundamental(symbol)),
            Err(product) => Dimension(Repr::Product(product)),
        }
    }

    pub(crate) fn to_product(&self) -> Product<char> {
        match &self.0 {
            Repr::Fundamental(symbol) => Product::single(*symbol),
            Repr::Product(product) => product.clone(),
        }
    }

    /// `symbol^pow`; `pow` must be non-zero.
    pub(crate) fn fundamental_power(symbol: char, pow: i32) -> Self {
        Self::from_product(Product::single_power(symbol, pow))
    }

    /// The symbol of a fundamental dimension.
    pub fn symbol(&self) -> Option<char> {
        match self.0 {
            Repr::Fundamental(symbol) => Some(symbol),
            Repr::Product(_) => None,
        }
    }

    pub fn is_fundamental(&self) -> bool {
        matches!(self.0, Repr::Fundamental(_))
    }

    pub fn is_none(&self) -> bool {
        matches!(&self.0, Repr::Product(p) if p.is_empty())
    }

    /// Exponent overflow is an arithmetic error, as for every operation
    /// below.
    pub fn multiply(&self, other: &Dimension) -> Result<Dimension> {
        Ok(Self::from_product(self.to_product().multiply(&other.to_product())?))
    }

    pub fn divide(&self, other: &Dimension) -> Result<Dimension> {
        let inverse = other.to_product().invert()?;
        Ok(Self::from_product(self.to_product().multiply(&inverse)?))
    }

    pub fn pow(&self, n: i32) -> Result<Dimension> {
        Ok(Self::from_product(self.to_product().pow(n)?))
    }

    /// Also fails when `n` is zero.
    pub fn root(&self, n: i32) -> Result<Dimension> {
        Ok(Self::from_product(self.to_product().root(n)?))
    }

    /// `self^(pow/root)` for a positive `root`.
    pub(crate) fn raise(&self, pow: i32, root: i32) -> Result<Dimension> {
        Ok(Self::from_product(
            self.to_product().raise(i64::from(pow), i64::from(root))?,
        ))
    }

    /// Each fundamental factor with its exponent. A fundamental dimension is
    /// its own single factor.
    pub(crate) fn factors(&self) -> Vec<(Dimension, i32, i32)> {
        self.to_product()
            .factors()
            .iter()
            .map(|f| (Dimension::new(*f.base()), f.pow(), f.root()))
            .collect()
    }

    /// `None` for a fundamental dimension, otherwise the exponent of every
    /// fundamental it is built from (empty for [`Dimension::NONE`]).
    pub fn product_dimensions(&self) -> Option<BTreeMap<char, Exponent>> {
        match &self.0 {
            Repr::Fundamental(_) => None,
            Repr::Product(product) => Some(
                product
                    .factors()
                    .iter()
                    .map(|f| {
                        (
                            *f.base(),
                            Exponent {
                                pow: f.pow(),
                                root: f.root(),
                            },
                        )
                    })
                    .collect(),
            ),
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnitError;

    fn energy() -> Dimension {
        Dimension::MASS
            .multiply(&Dimension::LENGTH.pow(2).unwrap())
            .and_then(|d| d.divide(&Dimension::TIME.pow(2)?))
            .unwrap()
    }

    #[test]
    fn equality_ignores_factor_order() {
        let a = Dimension::LENGTH.multiply(&Dimension::TIME.pow(-2).unwrap()).unwrap();
        let b = Dimension::TIME.pow(-2).unwrap().multiply(&Dimension::LENGTH).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_paths_reach_same_canonical_form() {
        let force = Dimension::MASS
            .multiply(&Dimension::LENGTH)
            .and_then(|d| d.divide(&Dimension::TIME.pow(2)?))
            .unwrap();
        assert_eq!(force.multiply(&Dimension::LENGTH).unwrap(), energy());
    }

    #[test]
    fn products_degenerate() {
        let l = Dimension::LENGTH;
        assert_eq!(l.pow(2).unwrap().root(2).unwrap(), l);
        assert!(l.pow(2).unwrap().root(2).unwrap().is_fundamental());
        assert_eq!(l.divide(&l).unwrap(), Dimension::NONE);
        assert!(l.pow(0).unwrap().is_none());
        assert_eq!(Dimension::NONE.multiply(&l).unwrap(), l);
        assert_eq!(Dimension::fundamental_power('L', 1), l);
        assert_eq!(Dimension::fundamental_power('T', -1), Dimension::TIME.pow(-1).unwrap());
    }

    #[test]
    fn root_of_order_zero_fails() {
        assert!(matches!(
            Dimension::LENGTH.root(0),
            Err(UnitError::Arithmetic(_))
        ));
    }

    #[test]
    fn exponent_overflow_fails() {
        let huge = Dimension::LENGTH.pow(i32::MAX).unwrap();
        assert!(matches!(
            huge.multiply(&Dimension::LENGTH),
            Err(UnitError::Arithmetic(_))
        ));
        assert!(matches!(
            Dimension::LENGTH.pow(i32::MIN).unwrap().pow(-1),
            Err(UnitError::Arithmetic(_))
        ));
    }

    #[test]
    fn product_dimensions() {
        assert_eq!(Dimension::MASS.product_dimensions(), None);
        assert_eq!(Dimension::NONE.product_dimensions(), Some(BTreeMap::new()));

        let velocity = Dimension::LENGTH.divide(&Dimension::TIME).unwrap();
        let map = velocity.product_dimensions().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&'L'].as_integer(), Some(1));
        assert_eq!(map[&'T'].as_integer(), Some(-1));

        let half = Dimension::LENGTH.root(2).unwrap();
        let map = half.product_dimensions().unwrap();
        assert_eq!(map[&'L'], Exponent { pow: 1, root: 2 });
        assert_eq!(map[&'L'].to_string(), "1/2");
    }

    #[test]
    fn custom_fundamentals() {
        let money = Dimension::new('$');
        assert!(money.is_fundamental());
        assert_eq!(money.symbol(), Some('$'));
        assert_ne!(money, Dimension::MASS);
    }
}
