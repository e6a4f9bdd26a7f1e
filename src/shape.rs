use crate::error::{AbError, AbResult};

/// Row/column pair of a row-major matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shape {
    rows: usize,
    cols: usize,
}

impl Shape {
    pub fn new(rows: usize, cols: usize) -> Shape {
        Shape { rows, cols }
    }

    /// Both dimensions positive and `rows * cols` representable.
    pub(crate) fn checked(rows: usize, cols: usize) -> AbResult<Shape> {
        if rows == 0 || cols == 0 {
            return Err(AbError::InvalidArgument(format!(
                "matrix dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        if rows.checked_mul(cols).is_none() {
            return Err(AbError::InvalidArgument(format!(
                "matrix dimensions {}x{} overflow",
                rows, cols
            )));
        }
        Ok(Shape { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims2(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn elem_count(&self) -> usize {
        self.rows * self.cols
    }

    // [rows, cols] => strides [cols, 1]
    #[inline(always)]
    pub fn linear_index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub(crate) fn offset(&self, row: usize, col: usize) -> AbResult<usize> {
        if row >= self.rows {
            return Err(AbError::out_of_range(row, self.rows));
        }
        if col >= self.cols {
            return Err(AbError::out_of_range(col, self.cols));
        }
        Ok(self.linear_index(row, col))
    }

    pub(crate) fn row_offset(&self, row: usize) -> AbResult<usize> {
        self.offset(row, 0)
    }
}
