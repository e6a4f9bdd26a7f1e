use crate::buffer::Buffer;
use crate::error::{AbError, AbResult};
use crate::shape::Shape;
use crate::Scalar;
use std::fmt;

/// Dense row-major matrix over one exclusively owned [`Buffer`].
///
/// `storage.len() == rows * cols` holds after every operation.
pub struct Matrix<T: Scalar> {
    storage: Buffer<T>,
    shape: Shape,
}

macro_rules! impl_elementwise_op {
    ($trt:ident, $mth:ident) => {
        pub fn $mth(&self, rhs: &Matrix<T>) -> AbResult<Matrix<T>> {
            self.zip_with(rhs, stringify!($mth), <T as std::ops::$trt>::$mth)
        }
    };
}

impl<T: Scalar> Matrix<T> {
    /// A `rows x cols` matrix of zeros.
    pub fn new(rows: usize, cols: usize) -> AbResult<Self> {
        let shape = Shape::checked(rows, cols)?;
        let mut storage = Buffer::with_capacity(shape.elem_count());
        storage.fill(T::zero(), shape.elem_count());
        Ok(Self { storage, shape })
    }

    /// Builds a matrix from `rows * cols` values laid out row-major.
    pub fn from_flat(data: &[T], rows: usize, cols: usize) -> AbResult<Self> {
        let shape = Shape::checked(rows, cols)?;
        if data.len() != shape.elem_count() {
            return Err(AbError::InvalidArgument(format!(
                "{} values cannot fill a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        let mut storage = Buffer::with_capacity(shape.elem_count());
        storage.extend_from_slice(data);
        Ok(Self { storage, shape })
    }

    pub fn from_rows<const N: usize>(rows: &[[T; N]]) -> AbResult<Self> {
        let shape = Shape::checked(rows.len(), N)?;
        let mut storage = Buffer::with_capacity(shape.elem_count());
        for row in rows {
            storage.extend_from_slice(row);
        }
        Ok(Self { storage, shape })
    }

    pub fn identity(n: usize) -> AbResult<Self> {
        let mut m = Self::new(n, n)?;
        for i in 0..n {
            m.set(i, i, T::one())?;
        }
        Ok(m)
    }

    pub fn make_copy(&self) -> Self {
        Self {
            storage: self.storage.make_copy(),
            shape: self.shape,
        }
    }

    pub fn rows(&self) -> usize {
        self.shape.rows()
    }

    pub fn cols(&self) -> usize {
        self.shape.cols()
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn storage(&self) -> &Buffer<T> {
        &self.storage
    }

    pub fn into_storage(self) -> Buffer<T> {
        self.storage
    }

    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    pub fn get(&self, row: usize, col: usize) -> AbResult<T> {
        let index = self.shape.offset(row, col)?;
        self.storage.get(index)
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> AbResult<()> {
        let index = self.shape.offset(row, col)?;
        self.storage.set(index, value)
    }

    /// Copy of one row as a buffer of length `cols`.
    pub fn row(&self, row: usize) -> AbResult<Buffer<T>> {
        let start = self.shape.row_offset(row)?;
        self.storage.slice(start, self.cols())
    }

    pub fn set_row(&mut self, row: usize, data: &[T]) -> AbResult<()> {
        let start = self.shape.row_offset(row)?;
        if data.len() != self.cols() {
            return Err(AbError::InvalidArgument(format!(
                "row of {} values does not fit {} columns",
                data.len(),
                self.cols()
            )));
        }
        self.storage.set_range(start, data)
    }

    /// Replaces every element `x` with `f(x)`, row by row.
    pub fn apply<F>(&mut self, mut f: F)
    where
        F: FnMut(T) -> T,
    {
        for x in self.storage.as_slice_mut() {
            *x = f(*x);
        }
    }

    /// Relabels the dimensions. Storage is untouched, so the element count
    /// must stay the same.
    pub fn reshape(&mut self, rows: usize, cols: usize) -> AbResult<()> {
        if rows == 0 || cols == 0 {
            return Err(AbError::InvalidArgument(format!(
                "matrix dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        if rows.checked_mul(cols) != Some(self.shape.elem_count()) {
            return Err(AbError::DimensionMismatch {
                op: "reshape",
                left: self.shape.dims2(),
                right: (rows, cols),
            });
        }
        log::debug!("reshape {:?} -> {}x{}", self.shape.dims2(), rows, cols);
        self.shape = Shape::new(rows, cols);
        Ok(())
    }

    /// Dense product `self * rhs`.
    pub fn matmul(&self, rhs: &Matrix<T>) -> AbResult<Matrix<T>> {
        if self.cols() != rhs.rows() {
            return Err(AbError::DimensionMismatch {
                op: "matmul",
                left: self.shape.dims2(),
                right: rhs.shape.dims2(),
            });
        }
        log::debug!(
            "matmul {:?} x {:?}",
            self.shape.dims2(),
            rhs.shape.dims2()
        );
        let (m, k) = self.shape.dims2();
        let n = rhs.cols();
        let mut out = Matrix::new(m, n)?;
        let out_shape = out.shape;
        let (l, r) = (self.as_slice(), rhs.as_slice());
        let dst = out.storage.as_slice_mut();
        for i in 0..m {
            for j in 0..n {
                let mut acc = T::zero();
                for x in 0..k {
                    acc = acc + l[self.shape.linear_index(i, x)] * r[rhs.shape.linear_index(x, j)];
                }
                dst[out_shape.linear_index(i, j)] = acc;
            }
        }
        Ok(out)
    }

    impl_elementwise_op!(Add, add);
    impl_elementwise_op!(Sub, sub);

    fn zip_with<F>(&self, rhs: &Matrix<T>, op: &'static str, f: F) -> AbResult<Matrix<T>>
    where
        F: Fn(T, T) -> T,
    {
        if self.shape != rhs.shape {
            return Err(AbError::DimensionMismatch {
                op,
                left: self.shape.dims2(),
                right: rhs.shape.dims2(),
            });
        }
        let mut out = self.make_copy();
        out.storage
            .as_slice_mut()
            .iter_mut()
            .zip(rhs.as_slice())
            .for_each(|(x, y)| *x = f(*x, *y));
        Ok(out)
    }

    /// Same shape and bit-identical elements.
    pub fn check_equal(&self, other: &Matrix<T>) -> bool {
        self.shape == other.shape && self.storage.check_equal(&other.storage)
    }
}

impl<T: Scalar> Clone for Matrix<T> {
    fn clone(&self) -> Self {
        self.make_copy()
    }
}

impl<T: Scalar> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.check_equal(other)
    }
}

impl<T: Scalar + fmt::Debug> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.shape.dims2();
        let v = self.as_slice();
        f.write_str("[")?;
        for i in 0..rows {
            if i > 0 {
                f.write_str(",\n ")?;
            }
            let start = self.shape.linear_index(i, 0);
            f.debug_list().entries(&v[start..start + cols]).finish()?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation;

    fn ones_2x2() -> Matrix<f32> {
        let mut m = Matrix::new(1, 4).unwrap();
        m.set_row(0, &[1.0, 1.0, 1.0, 1.0]).unwrap();
        m.reshape(2, 2).unwrap();
        m
    }

    #[test]
    fn test_new_is_zero() {
        let m = Matrix::<f64>::new(2, 3).unwrap();
        assert_eq!(m.storage().len(), 6);
        assert_eq!(m.storage().capacity(), 6);
        assert!(m.as_slice().iter().all(|&x| x == 0.0));
        assert!(matches!(
            Matrix::<f64>::new(0, 3),
            Err(AbError::InvalidArgument(_))
        ));
        assert!(matches!(
            Matrix::<f64>::new(3, 0),
            Err(AbError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_flat() {
        let m = Matrix::from_flat(&[1.0f32, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(m.get(0, 1), Ok(2.0));
        assert_eq!(m.get(1, 0), Ok(3.0));
        assert_eq!(m.storage().len(), m.rows() * m.cols());

        let expected = mat![[1.0f32, 2.0], [3.0, 4.0]].unwrap();
        assert!(m.check_equal(&expected));
        assert!(Matrix::from_flat(&[1.0f32, 2.0, 3.0], 2, 2).is_err());
    }

    #[test]
    fn test_make_copy() {
        let m = mat![[1.0f64, 2.0], [3.0, 4.0]].unwrap();
        let mut c = m.make_copy();
        assert!(c.check_equal(&m));
        c.set(0, 0, 9.0).unwrap();
        assert_eq!(m.get(0, 0), Ok(1.0));
        assert_ne!(c, m);
    }

    #[test]
    fn test_add_sub() {
        let a = ones_2x2();
        let b = ones_2x2();
        let add = a.add(&b).unwrap();
        let sub = a.sub(&b).unwrap();
        assert_eq!(add.shape().dims2(), (2, 2));
        assert_eq!(add.as_slice(), &[2.0; 4]);
        assert_eq!(sub.as_slice(), &[0.0; 4]);

        let c = Matrix::<f32>::new(1, 4).unwrap();
        assert_eq!(
            a.add(&c).unwrap_err(),
            AbError::DimensionMismatch {
                op: "add",
                left: (2, 2),
                right: (1, 4)
            }
        );
        assert!(a.sub(&c).is_err());
    }

    #[test]
    fn test_matmul_ones() {
        let a = ones_2x2();
        let p = a.matmul(&a).unwrap();
        assert_eq!(p.shape().dims2(), (2, 2));
        assert_eq!(p.as_slice(), &[2.0; 4]);
    }

    #[test]
    fn test_matmul_rect() {
        let a = mat![[1.0f64, 2.0, 3.0], [4.0, 5.0, 6.0]].unwrap();
        let b = mat![[7.0f64, 8.0], [9.0, 10.0], [11.0, 12.0]].unwrap();
        let p = a.matmul(&b).unwrap();
        assert_eq!(p.shape().dims2(), (2, 2));
        assert_eq!(p.as_slice(), &[58.0, 64.0, 139.0, 154.0]);

        assert!(matches!(
            a.matmul(&a),
            Err(AbError::DimensionMismatch { op: "matmul", .. })
        ));
    }

    #[test]
    fn test_matmul_identity() {
        let a = mat![[1.5f32, -2.0, 3.25], [4.0, 0.5, -6.0]].unwrap();
        let left = Matrix::identity(2).unwrap().matmul(&a).unwrap();
        let right = a.matmul(&Matrix::identity(3).unwrap()).unwrap();
        assert!(left.check_equal(&a));
        assert!(right.check_equal(&a));
    }

    #[test]
    fn test_bounds_are_strict() {
        let mut m = Matrix::<f32>::new(2, 3).unwrap();
        assert_eq!(m.get(2, 0), Err(AbError::IndexOutOfRange { index: 2, bound: 2 }));
        assert_eq!(m.get(0, 3), Err(AbError::IndexOutOfRange { index: 3, bound: 3 }));
        assert!(m.set(2, 0, 1.0).is_err());
        assert!(m.set(0, 3, 1.0).is_err());
        assert!(m.set(1, 2, 1.0).is_ok());
        assert_eq!(m.get(1, 2), Ok(1.0));
        assert!(m.row(2).is_err());
        assert!(m.set_row(2, &[0.0; 3]).is_err());
    }

    #[test]
    fn test_rows() {
        let mut m = mat![[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]].unwrap();
        let r = m.row(1).unwrap();
        assert_eq!(r.as_slice(), &[3.0, 4.0]);
        assert_eq!(r.capacity(), 2);

        m.set_row(2, &[7.0, 8.0]).unwrap();
        assert_eq!(m.as_slice(), &[1.0, 2.0, 3.0, 4.0, 7.0, 8.0]);
        assert!(matches!(
            m.set_row(0, &[1.0]),
            Err(AbError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_reshape_relabels() {
        let flat: Vec<f64> = (0..12).map(|x| x as f64).collect();
        let mut m = Matrix::from_flat(&flat, 3, 4).unwrap();
        for &(r, c) in &[(4usize, 3usize), (2, 6), (12, 1), (1, 12), (6, 2)] {
            m.reshape(r, c).unwrap();
            for i in 0..r {
                for j in 0..c {
                    assert_eq!(m.get(i, j).unwrap(), flat[i * c + j]);
                }
            }
        }
        m.reshape(3, 4).unwrap();
        // 3 + 4 == 5 + 2, but the element count differs.
        assert!(matches!(
            m.reshape(5, 2),
            Err(AbError::DimensionMismatch { op: "reshape", .. })
        ));
        assert!(matches!(m.reshape(0, 12), Err(AbError::InvalidArgument(_))));
        assert_eq!(m.shape().dims2(), (3, 4));
    }

    #[test]
    fn test_apply() {
        let mut t = ones_2x2();
        t.apply(activation::tanh);
        assert_eq!(t.as_slice(), &[1.0f32.tanh(); 4]);

        let mut s = ones_2x2();
        s.apply(activation::sigmoid);
        let expected = 1.0f32 / (1.0 + (-1.0f32).exp());
        assert_eq!(s.as_slice(), &[expected; 4]);

        let mut count = 0;
        let mut c = Matrix::<f64>::new(2, 2).unwrap();
        c.apply(|_| {
            count += 1;
            count as f64
        });
        assert_eq!(c.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_half_matrix() {
        use crate::f16;
        let one = f16::from_f32(1.0);
        let m = Matrix::from_flat(&[one; 4], 2, 2).unwrap();
        let p = m.matmul(&m).unwrap();
        assert!(p.as_slice().iter().all(|x| x.to_f32() == 2.0));
    }

    #[test]
    fn test_fmt() {
        let m = mat![[1.0f32, 2.0], [3.0, 4.0]].unwrap();
        assert_eq!(format!("{:?}", m), "[[1.0, 2.0],\n [3.0, 4.0]]");
    }
}
