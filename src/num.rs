use bytemuck::Pod;
use half::f16;

pub trait Zero {
    fn zero() -> Self;
}

pub trait One {
    fn one() -> Self;
}

/// Types with a least and a greatest value.
pub trait Bounded {
    fn min_value() -> Self;
    fn max_value() -> Self;
}

macro_rules! impl_int {
    ($($t:ty),+) => {
        $(
            impl Zero for $t {
                fn zero() -> Self {
                    0
                }
            }

            impl One for $t {
                fn one() -> Self {
                    1
                }
            }

            impl Bounded for $t {
                fn min_value() -> Self {
                    <$t>::MIN
                }

                fn max_value() -> Self {
                    <$t>::MAX
                }
            }
        )+
    };
}

macro_rules! impl_float {
    ($($t:ty),+) => {
        $(
            impl Zero for $t {
                fn zero() -> Self {
                    0.0
                }
            }

            impl One for $t {
                fn one() -> Self {
                    1.0
                }
            }

            impl Bounded for $t {
                fn min_value() -> Self {
                    <$t>::NEG_INFINITY
                }

                fn max_value() -> Self {
                    <$t>::INFINITY
                }
            }
        )+
    };
}

impl_int!(i32, i64, u32, u64, usize);
impl_float!(f32, f64);

impl Zero for f16 {
    fn zero() -> Self {
        Self::ZERO
    }
}

impl One for f16 {
    fn one() -> Self {
        Self::ONE
    }
}

impl Bounded for f16 {
    fn min_value() -> Self {
        Self::NEG_INFINITY
    }

    fn max_value() -> Self {
        Self::INFINITY
    }
}

/// A value that can be accumulated by any reduction strategy,
/// including ones that move partial results across an accelerator boundary.
pub trait Scalar:
    Sized + Copy + Pod + PartialOrd + Zero + One + Bounded + Send + Sync + sealed::Sealed
{
}

impl Scalar for f32 {}
impl Scalar for f64 {}
impl Scalar for f16 {}
impl Scalar for i32 {}
impl Scalar for i64 {}
impl Scalar for u32 {}
impl Scalar for u64 {}
impl Scalar for usize {}

mod sealed {
    use half::f16;

    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for f16 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
    impl Sealed for usize {}
}
