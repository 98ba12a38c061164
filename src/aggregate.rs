//! Associative operators a [`SegmentTree`](crate::SegmentTree) can aggregate with.

use std::fmt::Debug;
use std::marker::PhantomData;

/// An associative binary operator together with its neutral element.
///
/// Implementations must satisfy, for all `a`, `b`, `c`:
///
/// - `combine(a, combine(b, c)) == combine(combine(a, b), c)`
/// - `combine(a, neutral()) == combine(neutral(), a) == a`
///
/// The neutral element is what an empty range aggregates to, and what a
/// padded slot in the backing store holds.
pub trait Aggregate {
    type Value: Copy + Debug + PartialEq;

    fn neutral() -> Self::Value;

    fn combine(left: Self::Value, right: Self::Value) -> Self::Value;
}

/// Range sum. Neutral element is zero.
///
/// Integer sums wrap on overflow, so every aggregate is the exact sum modulo
/// `2^BITS`. Wrapping addition is associative, which keeps queries over any
/// split of a range consistent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum<T>(PhantomData<T>);

/// Range minimum. Neutral element is the largest representable value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Min<T>(PhantomData<T>);

/// Range maximum. Neutral element is the smallest representable value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max<T>(PhantomData<T>);

macro_rules! impl_int_aggregates {
    ($($t:ty),*) => {$(
        impl Aggregate for Sum<$t> {
            type Value = $t;

            #[inline]
            fn neutral() -> $t {
                0
            }

            #[inline]
            fn combine(left: $t, right: $t) -> $t {
                left.wrapping_add(right)
            }
        }

        impl Aggregate for Min<$t> {
            type Value = $t;

            #[inline]
            fn neutral() -> $t {
                <$t>::MAX
            }

            #[inline]
            fn combine(left: $t, right: $t) -> $t {
                left.min(right)
            }
        }

        impl Aggregate for Max<$t> {
            type Value = $t;

            #[inline]
            fn neutral() -> $t {
                <$t>::MIN
            }

            #[inline]
            fn combine(left: $t, right: $t) -> $t {
                left.max(right)
            }
        }
    )*};
}

impl_int_aggregates!(i32, i64, isize, u32, u64, usize);

impl Aggregate for Sum<f64> {
    type Value = f64;

    #[inline]
    fn neutral() -> f64 {
        0.
    }

    #[inline]
    fn combine(left: f64, right: f64) -> f64 {
        left + right
    }
}

impl Aggregate for Min<f64> {
    type Value = f64;

    #[inline]
    fn neutral() -> f64 {
        f64::INFINITY
    }

    #[inline]
    fn combine(left: f64, right: f64) -> f64 {
        left.min(right)
    }
}

impl Aggregate for Max<f64> {
    type Value = f64;

    #[inline]
    fn neutral() -> f64 {
        f64::NEG_INFINITY
    }

    #[inline]
    fn combine(left: f64, right: f64) -> f64 {
        left.max(right)
    }
}
