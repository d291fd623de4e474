//! Additive synthesis of a pixel matrix into 8-bit PCM.

use alloc::format;
use alloc::vec;

use tracing::trace;

use crate::buffer::{AudioBuffer, PcmFormat};
use crate::error::{Error, Result};
use crate::matrix::PixelMatrix;
use crate::sine_table::SineTable;

/// Render `matrix` against a prebuilt `table`.
///
/// Every output sample is the sum over rows of
/// `pixel[row][col] · level_scale · table[row][i]`, hard-clipped to
/// `[-1, 1]` and rounded to `value · 127`. Nothing is normalized here; pick
/// `level_scale` to suit the matrix's quantization range.
///
/// The matrix must have exactly the table's row and column counts, otherwise
/// [`Error::InvalidMatrix`] is returned before any buffer is allocated.
pub fn synthesize(matrix: &PixelMatrix, table: &SineTable, level_scale: f64) -> Result<AudioBuffer> {
    if matrix.num_rows() != table.num_rows() || matrix.num_cols() != table.num_cols() {
        return Err(Error::matrix(format!(
            "matrix is {}x{}, tables were built for {}x{}",
            matrix.num_rows(),
            matrix.num_cols(),
            table.num_rows(),
            table.num_cols()
        )));
    }

    let spf = table.samples_per_frame();
    let mut samples = vec![0i8; table.row_len()];
    let mut clipped = 0usize;

    for (col, frame) in samples.chunks_exact_mut(spf.max(1)).enumerate() {
        for (sample, out) in frame.iter_mut().enumerate() {
            let i = col * spf + sample;

            let value: f64 = matrix
                .rows()
                .zip(table.rows())
                .map(|(pixels, sines)| f64::from(pixels[col]) * level_scale * sines[i])
                .sum();

            if !(-1.0..=1.0).contains(&value) {
                clipped += 1;
            }
            *out = quantize(value);
        }
    }

    trace!(samples = samples.len(), clipped, "synthesized");

    Ok(AudioBuffer::new(samples, PcmFormat::mono_i8(table.sample_rate())))
}

/// Hard-clip to `[-1, 1]` and scale to a signed byte.
#[inline]
pub fn quantize(value: f64) -> i8 {
    // NaN only shows up with a non-finite level scale; treat it as silence
    if value.is_nan() {
        return 0;
    }
    (value.clamp(-1.0, 1.0) * 127.0).round() as i8
}

#[cfg(test)]
mod tests {
    use super::quantize;

    #[test]
    fn quantize_clips_and_rounds() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(1.0), 127);
        assert_eq!(quantize(-1.0), -127);
        assert_eq!(quantize(12.5), 127);
        assert_eq!(quantize(-1e300), -127);
        assert_eq!(quantize(f64::INFINITY), 127);
        assert_eq!(quantize(0.5), 64); // 63.5 rounds away from zero
        assert_eq!(quantize(-0.5), -64);
        assert_eq!(quantize(f64::NAN), 0);
    }
}
