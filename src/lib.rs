//! Growable element buffers and row-major dense matrices built on them.
//!
//! Everything here is single-threaded and synchronous. [`Buffer`] and
//! [`Matrix`] own their storage exclusively; sharing one mutably across
//! threads needs external synchronisation.
//!
//! Recoverable failures come back as [`AbError`]. Running out of memory while
//! allocating or growing a buffer aborts the process.

extern crate alloc;

#[macro_use]
mod macros;

pub mod activation;
mod buffer;
mod error;
mod matrix;
mod raw;
mod shape;

pub use buffer::Buffer;
pub use error::{AbError, AbResult};
pub use half::f16;
pub use matrix::Matrix;
pub use shape::Shape;

use num_traits::Float;

/// A fixed-size value a [`Buffer`] can hold.
///
/// # Safety
///
/// Implementors must not be zero-sized, must contain no padding bytes and
/// must accept the all-zero bit pattern as a valid value. Buffers hand out
/// zero-filled slots and compare elements byte by byte.
pub unsafe trait Element: Copy + 'static {}

macro_rules! impl_element {
    ($($e:ty),*) => {
        $(unsafe impl Element for $e {})*
    };
}

impl_element!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64, f16);

/// Matrix element type.
pub trait Scalar: Element + Float {}

impl<T: Element + Float> Scalar for T {}
