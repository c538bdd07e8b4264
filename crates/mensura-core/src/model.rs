//! Dimensional models.
//!
//! A model decides which dimensions count as the same kind of quantity. The
//! standard model keeps all seven SI dimensions independent; the others
//! collapse some of them into each other through fundamental constants, so
//! that for instance mass and energy become commensurable once the speed of
//! light is taken to be one.
//!
//! The active model is scoped per thread. [`DimensionalModel::enter`] pushes a
//! model and returns a guard that restores the previous one when dropped,
//! including during unwinding. Threads never inherit the active model from
//! the thread that spawned them.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::converter::Converter;
use crate::dimension::Dimension;
use crate::error::{Result, UnitError};
use crate::numeric::pow10;
use crate::unit::Unit;

/// How a model rewrites one fundamental dimension: the dimension it stands
/// for and the converter taking values across.
#[derive(Debug, Clone, PartialEq)]
pub struct Collapse {
    pub dimension: Dimension,
    pub transform: Converter,
}

/// A named table of dimension collapses, optionally inheriting the collapses
/// of a parent model. Models are static values compared by identity.
pub struct DimensionalModel {
    name: &'static str,
    parent: Option<&'static DimensionalModel>,
    collapse: fn(char) -> Option<Collapse>,
}

impl fmt::Debug for DimensionalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DimensionalModel")
            .field("name", &self.name)
            .field("parent", &self.parent.map(|p| p.name))
            .finish()
    }
}

const SPEED_OF_LIGHT: u64 = 299_792_458;
const SPEED_OF_LIGHT_SQUARED: u64 = SPEED_OF_LIGHT * SPEED_OF_LIGHT;

fn ratio(numer: BigInt, denom: BigInt) -> Converter {
    Converter::scale(BigRational::new(numer, denom))
}

fn no_collapse(_: char) -> Option<Collapse> {
    None
}

/// `c = 1`: length is measured in time.
fn relativistic(symbol: char) -> Option<Collapse> {
    (symbol == 'L').then(|| Collapse {
        dimension: Dimension::TIME,
        transform: ratio(BigInt::from(1), BigInt::from(SPEED_OF_LIGHT)),
    })
}

/// `k_B = 1`: temperature is measured in mass via `k_B / c²`.
fn high_energy(symbol: char) -> Option<Collapse> {
    (symbol == 'Θ').then(|| Collapse {
        dimension: Dimension::MASS,
        // k_B = 1.380649e-23 J/K
        transform: ratio(
            BigInt::from(1_380_649u64),
            pow10(29) * BigInt::from(SPEED_OF_LIGHT_SQUARED),
        ),
    })
}

/// `ħ = 1`: mass is measured in inverse time via `c² / ħ`.
fn quantum(symbol: char) -> Option<Collapse> {
    (symbol == 'M').then(|| Collapse {
        dimension: Dimension::fundamental_power('T', -1),
        // h = 6.62607015e-34 J·s, ħ = h / 2π
        transform: Converter::PiMultiply.concatenate(&ratio(
            BigInt::from(2) * BigInt::from(SPEED_OF_LIGHT_SQUARED) * pow10(42),
            BigInt::from(662_607_015u64),
        )),
    })
}

/// `G = 1`: time and current become dimensionless in Planck units.
fn natural(symbol: char) -> Option<Collapse> {
    match symbol {
        // t_P = 5.391247e-44 s
        'T' => Some(Collapse {
            dimension: Dimension::NONE,
            transform: ratio(pow10(50), BigInt::from(5_391_247u64)),
        }),
        // I_P = 3.4789e25 A
        'I' => Some(Collapse {
            dimension: Dimension::NONE,
            transform: ratio(BigInt::from(1), BigInt::from(34_789u64) * pow10(21)),
        }),
        _ => None,
    }
}

/// All seven SI dimensions independent.
pub static STANDARD: DimensionalModel = DimensionalModel::new("standard", None, no_collapse);
/// Standard, with length collapsing into time.
pub static RELATIVISTIC: DimensionalModel =
    DimensionalModel::new("relativistic", Some(&STANDARD), relativistic);
/// Relativistic, with temperature collapsing into mass.
pub static HIGH_ENERGY: DimensionalModel =
    DimensionalModel::new("high-energy", Some(&RELATIVISTIC), high_energy);
/// High-energy, with mass collapsing into inverse time.
pub static QUANTUM: DimensionalModel =
    DimensionalModel::new("quantum", Some(&HIGH_ENERGY), quantum);
/// Quantum, with time and electric current collapsing to dimensionless.
pub static NATURAL: DimensionalModel = DimensionalModel::new("natural", Some(&QUANTUM), natural);

/// The built-in models, from least to most collapsed.
pub static BUILT_IN: [&DimensionalModel; 5] =
    [&STANDARD, &RELATIVISTIC, &HIGH_ENERGY, &QUANTUM, &NATURAL];

impl DimensionalModel {
    pub const fn new(
        name: &'static str,
        parent: Option<&'static DimensionalModel>,
        collapse: fn(char) -> Option<Collapse>,
    ) -> Self {
        DimensionalModel {
            name,
            parent,
            collapse,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static DimensionalModel> {
        self.parent
    }

    /// The built-in model called `name`.
    pub fn by_name(name: &str) -> Option<&'static DimensionalModel> {
        BUILT_IN.iter().copied().find(|model| model.name == name)
    }

    /// Collapses this model adds on top of its ancestors, for the fundamental
    /// dimensions in `symbols`.
    pub fn own_collapses<'a>(
        &'a self,
        symbols: &'a [char],
    ) -> impl Iterator<Item = (char, Collapse)> + 'a {
        symbols
            .iter()
            .filter_map(move |&symbol| (self.collapse)(symbol).map(|c| (symbol, c)))
    }

    fn lookup(&self, symbol: char) -> Option<Collapse> {
        (self.collapse)(symbol).or_else(|| self.parent.and_then(|parent| parent.lookup(symbol)))
    }

    /// The dimension `dimension` reduces to under this model.
    pub fn fundamental_dimension(&self, dimension: &Dimension) -> Result<Dimension> {
        match dimension.symbol() {
            Some(symbol) => match self.lookup(symbol) {
                Some(collapse) => self.fundamental_dimension(&collapse.dimension),
                None => Ok(dimension.clone()),
            },
            None => dimension
                .factors()
                .iter()
                .try_fold(Dimension::NONE, |acc, (factor, pow, root)| {
                    acc.multiply(&self.fundamental_dimension(factor)?.raise(*pow, *root)?)
                }),
        }
    }

    /// Converter from values of `dimension` to values of its fundamental
    /// dimension under this model. Every collapse on the way must be linear.
    pub fn dimensional_transform(&self, dimension: &Dimension) -> Result<Converter> {
        match dimension.symbol() {
            Some(symbol) => match self.lookup(symbol) {
                Some(collapse) if !collapse.transform.is_linear() => {
                    Err(UnitError::unsupported(format!(
                        "{} model has a non-linear transform for {dimension}",
                        self.name
                    )))
                }
                Some(collapse) => Ok(self
                    .dimensional_transform(&collapse.dimension)?
                    .concatenate(&collapse.transform)),
                None => Ok(Converter::Identity),
            },
            None => {
                let mut transform = Converter::Identity;
                for (factor, pow, root) in dimension.factors() {
                    let step = self.dimensional_transform(&factor)?;
                    if step.is_identity() {
                        continue;
                    }
                    if root != 1 {
                        return Err(UnitError::unsupported(format!(
                            "{dimension} holds a collapsed dimension with fractional exponent"
                        )));
                    }
                    transform = transform.concatenate(&step.pow(pow));
                }
                Ok(transform)
            }
        }
    }

    /// True if `a` and `b` share a dimension or reduce to the same one.
    pub fn commensurable(&self, a: &Unit, b: &Unit) -> bool {
        a.is_compatible_in(b, self)
    }

    /// Converter from `from` to `to` through the fundamental dimensions of
    /// this model.
    pub fn converter_between(&self, from: &Unit, to: &Unit) -> Result<Converter> {
        if !self.commensurable(from, to) {
            return Err(UnitError::incommensurable(from, to));
        }
        let this = self
            .dimensional_transform(&from.to_system_unit()?.dimension()?)?
            .concatenate(&from.converter_to_system_unit()?);
        let that = self
            .dimensional_transform(&to.to_system_unit()?.dimension()?)?
            .concatenate(&to.converter_to_system_unit()?);
        let converter = that.inverse().concatenate(&this);
        log::debug!(
            "{} model converts {from} to {to} with {converter}",
            self.name
        );
        Ok(converter)
    }

    /// Make this model the active one on the current thread until the
    /// returned guard is dropped.
    pub fn enter(&'static self) -> ModelScope {
        let depth = ACTIVE.with(|stack| {
            let mut stack = stack.borrow_mut();
            let depth = stack.len();
            stack.push(self);
            depth
        });
        log::debug!("entered {} model at depth {depth}", self.name);
        ModelScope {
            depth,
            _not_send: PhantomData,
        }
    }
}

impl PartialEq for DimensionalModel {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for DimensionalModel {}

impl fmt::Display for DimensionalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl FromStr for &'static DimensionalModel {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self> {
        DimensionalModel::by_name(&s.trim().to_ascii_lowercase()).ok_or_else(|| {
            let known: Vec<_> = BUILT_IN.iter().map(|m| m.name).collect();
            UnitError::invalid(format!(
                "unknown dimensional model '{s}', expected one of: {}",
                known.join(", ")
            ))
        })
    }
}

thread_local! {
    static ACTIVE: RefCell<Vec<&'static DimensionalModel>> = const { RefCell::new(Vec::new()) };
}

/// The model active on this thread; [`STANDARD`] outside any scope.
pub fn current() -> &'static DimensionalModel {
    ACTIVE
        .with(|stack| stack.borrow().last().copied())
        .unwrap_or(&STANDARD)
}

/// Run `f` with `model` active, restoring the previous model afterwards.
pub fn with_model<R>(model: &'static DimensionalModel, f: impl FnOnce() -> R) -> R {
    let _scope = model.enter();
    f()
}

/// Guard returned by [`DimensionalModel::enter`].
///
/// Dropping it restores the model that was active when it was created, even
/// if inner guards were leaked. It cannot leave its thread.
#[must_use = "the model is only active while the scope is alive"]
pub struct ModelScope {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ModelScope {
    fn drop(&mut self) {
        let restored = ACTIVE.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.truncate(self.depth);
            stack.last().map_or(STANDARD.name, |model| model.name)
        });
        if let Ok(restored) = restored {
            log::debug!("left model scope, {restored} model active");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy() -> Dimension {
        Dimension::MASS
            .multiply(&Dimension::LENGTH.pow(2).unwrap())
            .and_then(|d| d.divide(&Dimension::TIME.pow(2)?))
            .unwrap()
    }

    /// Length measured as the decimal logarithm of time.
    fn logarithmic(symbol: char) -> Option<Collapse> {
        if symbol != 'L' {
            return None;
        }
        Some(Collapse {
            dimension: Dimension::TIME,
            transform: Converter::log(10.0).ok()?,
        })
    }

    /// Mass measured in length, on top of [`logarithmic`].
    fn mass_as_length(symbol: char) -> Option<Collapse> {
        (symbol == 'M').then(|| Collapse {
            dimension: Dimension::LENGTH,
            transform: ratio(BigInt::from(2), BigInt::from(1)),
        })
    }

    static LOGARITHMIC: DimensionalModel = DimensionalModel::new("logarithmic", None, logarithmic);
    static LOGARITHMIC_MASS: DimensionalModel =
        DimensionalModel::new("logarithmic-mass", Some(&LOGARITHMIC), mass_as_length);

    #[test]
    fn standard_model_changes_nothing() {
        assert_eq!(STANDARD.fundamental_dimension(&energy()).unwrap(), energy());
        assert_eq!(
            STANDARD.dimensional_transform(&energy()).unwrap(),
            Converter::Identity
        );
    }

    #[test]
    fn relativistic_length_is_time() -> Result<()> {
        assert_eq!(
            RELATIVISTIC.fundamental_dimension(&Dimension::LENGTH)?,
            Dimension::TIME
        );
        assert_eq!(
            RELATIVISTIC.fundamental_dimension(&Dimension::LENGTH.divide(&Dimension::TIME)?)?,
            Dimension::NONE
        );
        assert_eq!(RELATIVISTIC.fundamental_dimension(&energy())?, Dimension::MASS);
        assert_eq!(
            RELATIVISTIC.dimensional_transform(&energy())?,
            Converter::rational(1, SPEED_OF_LIGHT_SQUARED)?
        );
        Ok(())
    }

    #[test]
    fn collapses_chain_through_parents() -> Result<()> {
        assert_eq!(
            HIGH_ENERGY.fundamental_dimension(&Dimension::TEMPERATURE)?,
            Dimension::MASS
        );
        assert_eq!(
            HIGH_ENERGY.fundamental_dimension(&Dimension::LENGTH)?,
            Dimension::TIME
        );
        assert_eq!(
            QUANTUM.fundamental_dimension(&Dimension::TEMPERATURE)?,
            Dimension::TIME.pow(-1)?
        );
        assert_eq!(
            NATURAL.fundamental_dimension(&Dimension::TEMPERATURE)?,
            Dimension::NONE
        );
        assert_eq!(NATURAL.fundamental_dimension(&energy())?, Dimension::NONE);
        assert!(NATURAL.dimensional_transform(&energy())?.is_linear());
        Ok(())
    }

    #[test]
    fn built_in_models_form_one_chain() {
        assert_eq!(STANDARD.parent(), None);
        for pair in BUILT_IN.windows(2) {
            assert_eq!(pair[1].parent(), Some(pair[0]), "{}", pair[1]);
        }
        assert_eq!(RELATIVISTIC.parent(), Some(&STANDARD));
    }

    #[test]
    fn non_linear_collapses_are_unsupported() {
        let length_squared = Dimension::LENGTH.pow(2).unwrap();
        for dimension in [Dimension::LENGTH, length_squared] {
            assert!(
                matches!(
                    LOGARITHMIC.dimensional_transform(&dimension),
                    Err(UnitError::UnsupportedOperation(_))
                ),
                "{dimension}"
            );
        }
        // Mass collapses linearly into length, which then collapses non-linearly.
        assert!(matches!(
            LOGARITHMIC_MASS.dimensional_transform(&Dimension::MASS),
            Err(UnitError::UnsupportedOperation(_))
        ));
        assert_eq!(
            LOGARITHMIC_MASS.fundamental_dimension(&Dimension::MASS).unwrap(),
            Dimension::TIME
        );
        assert_eq!(
            LOGARITHMIC_MASS.dimensional_transform(&Dimension::TIME).unwrap(),
            Converter::Identity
        );
    }

    #[test]
    fn active_model_is_scoped() {
        assert_eq!(current(), &STANDARD);
        {
            let _outer = RELATIVISTIC.enter();
            assert_eq!(current(), &RELATIVISTIC);
            with_model(&NATURAL, || assert_eq!(current(), &NATURAL));
            assert_eq!(current(), &RELATIVISTIC);
        }
        assert_eq!(current(), &STANDARD);
    }

    #[test]
    fn dropping_an_outer_scope_discards_leaked_inner_ones() {
        let outer = QUANTUM.enter();
        std::mem::forget(HIGH_ENERGY.enter());
        assert_eq!(current(), &HIGH_ENERGY);
        drop(outer);
        assert_eq!(current(), &STANDARD);
    }

    #[test]
    fn scope_is_restored_after_panic() {
        let result: std::thread::Result<()> = std::panic::catch_unwind(|| {
            with_model(&RELATIVISTIC, || panic!("inside model scope"));
        });
        assert!(result.is_err());
        assert_eq!(current(), &STANDARD);
    }

    #[test]
    fn threads_start_in_standard_model() {
        let _scope = NATURAL.enter();
        let seen = std::thread::spawn(|| current().name()).join().unwrap();
        assert_eq!(seen, "standard");
        assert_eq!(current(), &NATURAL);
    }

    #[test]
    fn models_parse_by_name() {
        let model: &DimensionalModel = "High-Energy".parse().unwrap();
        assert_eq!(model, &HIGH_ENERGY);
        assert!("metric".parse::<&DimensionalModel>().is_err());
        assert_eq!(NATURAL.parent(), Some(&QUANTUM));
    }

    #[test]
    fn own_collapses_exclude_inherited_ones() {
        let symbols = ['L', 'M', 'T', 'I', 'Θ', 'N', 'J'];
        let natural: Vec<_> = NATURAL.own_collapses(&symbols).map(|(s, _)| s).collect();
        assert_eq!(natural, vec!['T', 'I']);
        assert_eq!(STANDARD.own_collapses(&symbols).count(), 0);
    }
}
