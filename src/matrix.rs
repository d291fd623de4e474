//! Pixel intensity matrices.

use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use itertools::Itertools;

use crate::error::{Error, Result};

/// A rectangular grid of pixel intensities, stored row-major.
///
/// Each row becomes one frequency during synthesis and each column one frame
/// of audio. A `PixelMatrix` is never ragged: every constructor checks that
/// all rows have the same, non-zero length.
///
/// ```
/// use bildklang::PixelMatrix;
///
/// let m = PixelMatrix::from_rows(vec![vec![0, 15], vec![7, 3]]).unwrap();
/// assert_eq!(m.num_rows(), 2);
/// assert_eq!(m.get(1, 0), 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelMatrix {
    num_rows: usize,
    num_cols: usize,
    data: Vec<u16>,
}

impl PixelMatrix {
    /// Build a matrix from nested rows.
    ///
    /// Fails with [`Error::InvalidMatrix`] if there are no rows, the first row
    /// is empty, or any row differs in length from the first.
    pub fn from_rows(rows: Vec<Vec<u16>>) -> Result<Self> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, Vec::len);
        if num_rows == 0 || num_cols == 0 {
            return Err(Error::matrix("matrix is empty"));
        }

        if let Some((row, r)) = rows.iter().find_position(|r| r.len() != num_cols) {
            return Err(Error::matrix(format!(
                "row {} has {} columns, expected {}",
                row,
                r.len(),
                num_cols
            )));
        }

        Ok(Self {
            num_rows,
            num_cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Wrap a flat row-major buffer.
    pub fn from_flat(num_rows: usize, num_cols: usize, data: Vec<u16>) -> Result<Self> {
        if num_rows == 0 || num_cols == 0 {
            return Err(Error::matrix("matrix is empty"));
        }
        let len = checked_len(num_rows, num_cols)?;
        if data.len() != len {
            return Err(Error::matrix(format!(
                "{} values can't fill a {}x{} matrix",
                data.len(),
                num_rows,
                num_cols
            )));
        }
        Ok(Self { num_rows, num_cols, data })
    }

    /// An all-zero (silent) matrix.
    pub fn zeros(num_rows: usize, num_cols: usize) -> Result<Self> {
        let len = checked_len(num_rows, num_cols)?;
        Self::from_flat(num_rows, num_cols, alloc::vec![0; len])
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Value at `(row, col)`. Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u16 {
        assert!(col < self.num_cols, "column {} out of bounds", col);
        self.data[row * self.num_cols + col]
    }

    /// Overwrite the value at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: u16) {
        assert!(col < self.num_cols, "column {} out of bounds", col);
        self.data[row * self.num_cols + col] = value;
    }

    /// One row as a slice.
    #[inline]
    pub fn row(&self, row: usize) -> &[u16] {
        let start = row * self.num_cols;
        &self.data[start..start + self.num_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u16]> {
        self.data.chunks_exact(self.num_cols)
    }

    /// The raw row-major values.
    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.data
    }

    /// Largest value in the matrix.
    pub fn max_value(&self) -> u16 {
        self.data.iter().copied().max().unwrap_or(0)
    }
}

fn checked_len(num_rows: usize, num_cols: usize) -> Result<usize> {
    num_rows
        .checked_mul(num_cols)
        .ok_or_else(|| Error::matrix(format!("a {}x{} matrix is too large", num_rows, num_cols)))
}

impl fmt::Display for PixelMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "[{}]", row.iter().join(", "))?;
        }
        Ok(())
    }
}
