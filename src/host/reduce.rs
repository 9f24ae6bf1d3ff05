use std::ops::{Add, Mul};

#[cfg(not(feature = "rayon"))]
use itertools::Itertools;

use crate::{num::Scalar, policy::ReductionStrategy};

/// An associative and commutative combining operation with an identity.
pub trait ReduceOp<T>: Send + Sync + 'static {
    fn identity() -> T;
    fn combine(lhs: T, rhs: T) -> T;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sum;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Product;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Min;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Max;

impl<T: Scalar + Add<Output = T>> ReduceOp<T> for Sum {
    #[inline]
    fn identity() -> T {
        T::zero()
    }

    #[inline]
    fn combine(lhs: T, rhs: T) -> T {
        lhs + rhs
    }
}

impl<T: Scalar + Mul<Output = T>> ReduceOp<T> for Product {
    #[inline]
    fn identity() -> T {
        T::one()
    }

    #[inline]
    fn combine(lhs: T, rhs: T) -> T {
        lhs * rhs
    }
}

impl<T: Scalar> ReduceOp<T> for Min {
    #[inline]
    fn identity() -> T {
        T::max_value()
    }

    #[inline]
    fn combine(lhs: T, rhs: T) -> T {
        if rhs < lhs { rhs } else { lhs }
    }
}

impl<T: Scalar> ReduceOp<T> for Max {
    #[inline]
    fn identity() -> T {
        T::min_value()
    }

    #[inline]
    fn combine(lhs: T, rhs: T) -> T {
        if rhs > lhs { rhs } else { lhs }
    }
}

/// Reduces `map(0..len)` with `Op` under `strategy`.
///
/// [`ReductionStrategy::Sequential`] folds left to right from the identity.
/// [`ReductionStrategy::Accelerator`] combines in an unspecified order.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", skip(map)))]
pub fn reduce<T, Op, F>(strategy: ReductionStrategy, len: usize, map: F) -> T
where
    T: Scalar,
    Op: ReduceOp<T>,
    F: Fn(usize) -> T + Send + Sync,
{
    log::trace!("{strategy} over {len} values");
    match strategy {
        ReductionStrategy::Sequential => (0..len).map(map).fold(Op::identity(), Op::combine),
        #[cfg(feature = "rayon")]
        ReductionStrategy::Accelerator => {
            use rayon::prelude::*;
            (0..len)
                .into_par_iter()
                .map(map)
                .reduce(Op::identity, Op::combine)
        }
        #[cfg(not(feature = "rayon"))]
        ReductionStrategy::Accelerator => (0..len)
            .map(map)
            .tree_reduce(Op::combine)
            .unwrap_or_else(Op::identity),
    }
}
