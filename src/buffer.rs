use crate::error::{AbError, AbResult};
use crate::raw::{capacity_overflow, RawBuf};
use crate::Element;
use std::fmt;
use std::mem;

/// Growable storage of fixed-size elements.
///
/// `len` counts the populated prefix, `capacity` the allocated slots. Slots
/// past `len` are zero after construction and after every growth, so reading
/// them with [`Buffer::get`] is deterministic.
pub struct Buffer<T: Element> {
    raw: RawBuf<T>,
}

impl<T: Element> Buffer<T> {
    /// An empty buffer with no allocation. The first append grows it to 2 slots.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// An empty buffer with `capacity` zeroed slots.
    pub fn with_capacity(capacity: usize) -> Self {
        debug_assert!(mem::size_of::<T>() > 0);
        Self {
            raw: RawBuf::with_capacity(capacity),
        }
    }

    /// A buffer whose capacity and length both equal `values.len()`.
    pub fn from_slice(values: &[T]) -> Self {
        let mut b = Self::with_capacity(values.len());
        b.extend_from_slice(values);
        b
    }

    /// `a`'s populated elements followed by `b`'s, in a fresh allocation sized
    /// exactly to fit them.
    pub fn concat(a: &Buffer<T>, b: &Buffer<T>) -> Self {
        let mut out = Self::with_capacity(a.len() + b.len());
        out.extend_from_slice(a.as_slice());
        out.extend_from_slice(b.as_slice());
        out
    }

    /// Deep copy with the same capacity and length.
    pub fn make_copy(&self) -> Self {
        let mut out = Self::with_capacity(self.capacity());
        out.raw.copy_from(0, self.as_slice());
        out.raw.set_len(self.len());
        out
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.cap()
    }

    #[inline]
    pub fn item_size(&self) -> usize {
        mem::size_of::<T>()
    }

    pub fn as_slice(&self) -> &[T] {
        self.raw.as_slice()
    }

    pub fn as_slice_mut(&mut self) -> &mut [T] {
        self.raw.as_slice_mut()
    }

    /// Every allocated slot, populated or not.
    pub fn allocated(&self) -> &[T] {
        self.raw.allocated()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Reads slot `index`. Any slot below `capacity` is readable.
    pub fn get(&self, index: usize) -> AbResult<T> {
        match self.raw.allocated().get(index) {
            Some(v) => Ok(*v),
            None => Err(AbError::out_of_range(index, self.capacity())),
        }
    }

    /// Overwrites slot `index` without changing `len`.
    pub fn set(&mut self, index: usize, value: T) -> AbResult<()> {
        let cap = self.capacity();
        match self.raw.allocated_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(AbError::out_of_range(index, cap)),
        }
    }

    /// Overwrites `values.len()` slots starting at `start`. The range must be
    /// non-empty and lie within `capacity`; `len` is unchanged.
    pub fn set_range(&mut self, start: usize, values: &[T]) -> AbResult<()> {
        if values.is_empty() {
            return Err("set_range needs at least one element".into());
        }
        let cap = self.capacity();
        match start.checked_add(values.len()) {
            Some(end) if end <= cap => {
                self.raw.allocated_mut()[start..end].copy_from_slice(values);
                Ok(())
            }
            _ => Err(AbError::InvalidArgument(format!(
                "range starting at {} with {} elements exceeds capacity {}",
                start,
                values.len(),
                cap
            ))),
        }
    }

    /// Copies `n` populated elements starting at `start` into a new buffer of
    /// capacity `n`.
    pub fn slice(&self, start: usize, n: usize) -> AbResult<Buffer<T>> {
        let len = self.len();
        match start.checked_add(n) {
            Some(end) if end <= len => Ok(Self::from_slice(&self.as_slice()[start..end])),
            end => Err(AbError::out_of_range(end.unwrap_or(usize::MAX), len)),
        }
    }

    pub fn push(&mut self, value: T) {
        self.reserve(1);
        let len = self.len();
        self.raw.allocated_mut()[len] = value;
        self.raw.set_len(len + 1);
    }

    pub fn extend_from_slice(&mut self, values: &[T]) {
        if values.is_empty() {
            return;
        }
        self.reserve(values.len());
        let len = self.len();
        self.raw.copy_from(len, values);
        self.raw.set_len(len + values.len());
    }

    /// Appends `n` copies of `value`.
    pub fn fill(&mut self, value: T, n: usize) {
        self.reserve(n);
        self.raw.fill(value, n);
    }

    /// Ensures room for `additional` more elements.
    ///
    /// Capacity doubles (0 counts as 1) or jumps straight to the required
    /// size when doubling is not enough. Never shrinks.
    pub fn reserve(&mut self, additional: usize) {
        let required = match self.len().checked_add(additional) {
            Some(r) => r,
            None => capacity_overflow(),
        };
        let cap = self.capacity();
        if required <= cap {
            return;
        }
        let doubled = match cap.max(1).checked_mul(2) {
            Some(d) => d,
            None => capacity_overflow(),
        };
        let new_cap = doubled.max(required);
        log::trace!("buffer grow: {} -> {} slots", cap, new_cap);
        self.raw.grow_to(new_cap);
    }

    /// Same length, same capacity and bit-identical populated elements.
    pub fn check_equal(&self, other: &Buffer<T>) -> bool {
        self.len() == other.len()
            && self.capacity() == other.capacity()
            && self.raw.as_bytes() == other.raw.as_bytes()
    }
}

impl<T: Element> Default for Buffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        self.make_copy()
    }
}

impl<T: Element> PartialEq for Buffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.check_equal(other)
    }
}

impl<T: Element> Eq for Buffer<T> {}

impl<T: Element> From<Vec<T>> for Buffer<T> {
    fn from(v: Vec<T>) -> Self {
        Self::from_slice(&v)
    }
}

impl<T: Element> From<&[T]> for Buffer<T> {
    fn from(v: &[T]) -> Self {
        Self::from_slice(v)
    }
}

impl<'a, T: Element> IntoIterator for &'a Buffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Element + fmt::Debug> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
