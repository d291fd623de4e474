//! Precomputed sinusoids for every row frequency and output sample.

use alloc::vec::Vec;

use crate::frequency::FrequencyTable;

/// `num_rows × (num_cols · samples_per_frame)` sine values in `[-1, 1]`.
///
/// Entry `(r, i)` is `sin(2π · f[r] · i / sample_rate)` where `i` is the
/// absolute sample index `col · samples_per_frame + sample`. Building it is
/// the expensive part of setting up a session; synthesis only reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct SineTable {
    num_rows: usize,
    num_cols: usize,
    samples_per_frame: usize,
    sample_rate: u32,
    /// Row-major, `row_len()` values per row
    data: Vec<f64>,
}

impl SineTable {
    /// Precompute the table for `frequencies` over `num_cols` frames of
    /// `samples_per_frame` samples each.
    ///
    /// Panics if the table size overflows `usize`;
    /// [`SessionConfig::validate`](crate::SessionConfig::validate) rules
    /// such sizes out before a session builds its table.
    pub fn build(
        frequencies: &FrequencyTable,
        num_cols: usize,
        samples_per_frame: usize,
        sample_rate: u32,
    ) -> Self {
        let row_len = num_cols * samples_per_frame;
        let rate = f64::from(sample_rate);
        let mut data = Vec::with_capacity(frequencies.len() * row_len);

        for frequency in frequencies.iter() {
            let omega = 2.0 * core::f64::consts::PI * frequency;
            // i = col * samples_per_frame + sample walks 0..row_len in order
            data.extend((0..row_len).map(|i| (omega * (i as f64 / rate)).sin()));
        }

        Self {
            num_rows: frequencies.len(),
            num_cols,
            samples_per_frame,
            sample_rate,
            data,
        }
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    #[inline]
    pub fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples per row, which is also the length of a synthesized buffer.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.num_cols * self.samples_per_frame
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let len = self.row_len();
        &self.data[row * len..(row + 1) * len]
    }

    #[inline]
    pub fn get(&self, row: usize, index: usize) -> f64 {
        self.row(row)[index]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on 0, and an empty row has nothing to yield anyway
        self.data.chunks_exact(self.row_len().max(1))
    }
}
