//! Row to frequency mapping.

use alloc::format;
use alloc::vec::Vec;
use core::ops::Index;

use crate::error::{Error, Result};

/// One frequency per matrix row, highest at row 0, lowest at the last row.
///
/// Built once per parameter set and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyTable {
    frequencies: Vec<f64>,
}

impl FrequencyTable {
    /// Spread `num_rows` frequencies linearly from `max_frequency` (row 0)
    /// down to `min_frequency` (row `num_rows - 1`).
    ///
    /// ```
    /// use bildklang::FrequencyTable;
    ///
    /// let table = FrequencyTable::compute(4, 1000.0, 4000.0).unwrap();
    /// assert_eq!(table.as_slice(), &[4000.0, 3000.0, 2000.0, 1000.0]);
    /// ```
    pub fn compute(num_rows: usize, min_frequency: f64, max_frequency: f64) -> Result<Self> {
        if num_rows < 2 {
            return Err(Error::config(format!("need at least 2 rows, got {}", num_rows)));
        }
        if !min_frequency.is_finite() || !max_frequency.is_finite() {
            return Err(Error::config("frequency bounds must be finite"));
        }
        if min_frequency < 0.0 {
            return Err(Error::config(format!("negative minimum frequency {}", min_frequency)));
        }
        if max_frequency < min_frequency {
            return Err(Error::config(format!(
                "maximum frequency {} is below minimum frequency {}",
                max_frequency, min_frequency
            )));
        }

        let span = max_frequency - min_frequency;
        let last = num_rows - 1;
        let frequencies = (0..num_rows)
            .map(|row| match row {
                // pinned so rounding can't drift off the lower bound
                r if r == last => min_frequency,
                r => max_frequency - r as f64 * span / last as f64,
            })
            .collect();

        Ok(Self { frequencies })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Always false; a table has at least two rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.frequencies.iter().copied()
    }
}

impl Index<usize> for FrequencyTable {
    type Output = f64;

    #[inline]
    fn index(&self, row: usize) -> &f64 {
        &self.frequencies[row]
    }
}
