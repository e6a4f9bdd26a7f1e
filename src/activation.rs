//! Element transforms for [`Matrix::apply`](crate::Matrix::apply).

use crate::Scalar;

pub fn identity<T: Scalar>(x: T) -> T {
    x
}

/// `1 / (1 + e^-x)`
pub fn sigmoid<T: Scalar>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

pub fn tanh<T: Scalar>(x: T) -> T {
    x.tanh()
}

// NaN stays NaN.
pub fn relu<T: Scalar>(x: T) -> T {
    if x < T::zero() {
        T::zero()
    } else {
        x
    }
}
