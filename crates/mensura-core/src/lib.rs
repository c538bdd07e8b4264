//! Symbolic physical units.
//!
//! The crate models units of measurement as immutable algebraic values:
//!
//! * [`Converter`] – numeric transformations between unit scales, with a
//!   float path and an exact decimal path.
//! * [`Dimension`] – kinds of quantity as products of fundamental dimensions.
//! * [`Unit`] – base, alternate, product, transformed and annotated units,
//!   closed under multiplication, division, powers and roots.
//! * [`DimensionalModel`] – which dimensions are commensurable, scoped per
//!   thread, so that e.g. mass converts to energy under a relativistic model.
//!
//! ```
//! use mensura_core::si::{KILOMETRE, METRE};
//!
//! let converter = KILOMETRE.converter_to(&METRE).unwrap();
//! assert_eq!(converter.convert(1.5), 1500.0);
//! ```

pub mod converter;
pub mod dimension;
pub mod error;
mod format;
pub mod model;
pub mod numeric;
mod product;
pub mod si;
pub mod unit;

pub use converter::Converter;
pub use dimension::{Dimension, Exponent};
pub use error::{Result, UnitError};
pub use format::fmt_float;
pub use model::{DimensionalModel, ModelScope, current, with_model};
pub use numeric::Precision;
pub use product::Factor;
pub use unit::Unit;
