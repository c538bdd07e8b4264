//! Canonical products of rational powers.
//!
//! Units and dimensions share one representation for compound values: a list
//! of `(base, pow, root)` factors meaning `∏ base^(pow/root)`. Canonical form
//! has no duplicate bases, no zero powers, a positive root and
//! `gcd(|pow|, root) == 1`. Equality and hashing ignore factor order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use num_integer::Integer;

use crate::error::{Result, UnitError};

/// One factor of a canonical product: `base^(pow/root)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Factor<K> {
    base: K,
    pow: i32,
    root: i32,
}

impl<K> Factor<K> {
    /// Build a factor reduced by the GCD of its exponent; `root` must be
    /// positive. Fails when the reduced exponent does not fit an `i32`.
    pub(crate) fn new(base: K, pow: i64, root: i64) -> Result<Self> {
        debug_assert!(root > 0, "factor root must be positive");
        let gcd = pow.gcd(&root).max(1);
        let (reduced_pow, reduced_root) = (pow / gcd, root / gcd);
        match (i32::try_from(reduced_pow), i32::try_from(reduced_root)) {
            (Ok(pow), Ok(root)) => Ok(Factor { base, pow, root }),
            _ => Err(UnitError::arithmetic(format!(
                "exponent {reduced_pow}/{reduced_root} overflows"
            ))),
        }
    }

    pub fn base(&self) -> &K {
        &self.base
    }

    pub fn pow(&self) -> i32 {
        self.pow
    }

    pub fn root(&self) -> i32 {
        self.root
    }

    /// True for `base^1`.
    pub fn is_plain(&self) -> bool {
        self.pow == 1 && self.root == 1
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Product<K> {
    factors: Vec<Factor<K>>,
}

impl<K> Product<K> {
    pub(crate) const fn empty() -> Self {
        Product {
            factors: Vec::new(),
        }
    }

    pub(crate) fn single(base: K) -> Self {
        Product::single_power(base, 1)
    }

    /// `base^pow` for a non-zero `pow`.
    pub(crate) fn single_power(base: K, pow: i32) -> Self {
        debug_assert!(pow != 0, "zero power of a single base");
        Product {
            factors: vec![Factor { base, pow, root: 1 }],
        }
    }

    pub(crate) fn factors(&self) -> &[Factor<K>] {
        &self.factors
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Unwrap a product that degenerated to a single plain base.
    pub(crate) fn into_single(self) -> std::result::Result<K, Self> {
        match <[Factor<K>; 1]>::try_from(self.factors) {
            Ok([factor]) if factor.is_plain() => Ok(factor.base),
            Ok([factor]) => Err(Product {
                factors: vec![factor],
            }),
            Err(factors) => Err(Product { factors }),
        }
    }
}

impl<K: Clone + PartialEq> Product<K> {
    /// Merge two canonical products.
    ///
    /// Bases present on both sides combine their exponents by
    /// cross-multiplication and vanish when the resulting power is zero.
    pub(crate) fn multiply(&self, other: &Self) -> Result<Self> {
        let mut factors = Vec::with_capacity(self.factors.len() + other.factors.len());
        for left in &self.factors {
            match other.factors.iter().find(|right| right.base == left.base) {
                Some(right) => {
                    let (lp, lr) = (i64::from(left.pow), i64::from(left.root));
                    let (rp, rr) = (i64::from(right.pow), i64::from(right.root));
                    let pow = lp * rr + rp * lr;
                    if pow != 0 {
                        factors.push(Factor::new(left.base.clone(), pow, lr * rr)?);
                    }
                }
                None => factors.push(left.clone()),
            }
        }
        for right in &other.factors {
            if !self.factors.iter().any(|left| left.base == right.base) {
                factors.push(right.clone());
            }
        }
        log::trace!(
            "merged {} and {} factors into {}",
            self.factors.len(),
            other.factors.len(),
            factors.len()
        );
        Ok(Product { factors })
    }

    pub(crate) fn invert(&self) -> Result<Self> {
        self.raise(-1, 1)
    }

    pub(crate) fn pow(&self, n: i32) -> Result<Self> {
        self.raise(i64::from(n), 1)
    }

    pub(crate) fn root(&self, n: i32) -> Result<Self> {
        match i64::from(n) {
            0 => Err(UnitError::arithmetic("root of order zero")),
            n if n > 0 => self.raise(1, n),
            n => self.raise(-1, -n),
        }
    }

    /// Raise every factor to `pow/root`; `root` must be positive.
    pub(crate) fn raise(&self, pow: i64, root: i64) -> Result<Self> {
        if pow == 0 {
            return Ok(Product::empty());
        }
        let factors = self
            .factors
            .iter()
            .map(|f| {
                match (
                    i64::from(f.pow).checked_mul(pow),
                    i64::from(f.root).checked_mul(root),
                ) {
                    (Some(p), Some(r)) => Factor::new(f.base.clone(), p, r),
                    _ => Err(UnitError::arithmetic(format!(
                        "exponent {}/{} raised to {pow}/{root} overflows",
                        f.pow, f.root
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Product { factors })
    }
}

impl<K: PartialEq> PartialEq for Product<K> {
    fn eq(&self, other: &Self) -> bool {
        self.factors.len() == other.factors.len()
            && self.factors.iter().all(|f| other.factors.contains(f))
    }
}

impl<K: Eq> Eq for Product<K> {}

impl<K: Hash> Hash for Product<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self.factors.iter().fold(0u64, |acc, factor| {
            let mut hasher = DefaultHasher::new();
            factor.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        state.write_usize(self.factors.len());
        state.write_u64(combined);
    }
}
