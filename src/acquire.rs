//! Turning image files into pixel matrices.
//!
//! Decoding, grayscale conversion and resizing are done by the `image`
//! crate; this module only adapts its buffers to [`PixelMatrix`].
//!
//! ```no_run
//! use bildklang::{acquire, Session, SessionConfig};
//!
//! let config = SessionConfig::default().with_max_level(15).with_normalized_levels();
//! let matrix = acquire::load_for_session("scanline.png", &config).unwrap();
//! let mut session = Session::new(config).unwrap();
//! let buffer = session.synthesize(&matrix).unwrap();
//! ```

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma};
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::matrix::PixelMatrix;

/// Highest value of an 8-bit grayscale pixel.
pub const GRAY_MAX: u16 = 255;

/// Decode an image file and convert it to 8-bit grayscale at full size.
pub fn load_grayscale(path: impl AsRef<Path>) -> Result<PixelMatrix> {
    let path = path.as_ref();
    let gray = image::open(path)?.to_luma8();
    debug!(path = %path.display(), width = gray.width(), height = gray.height(), "image decoded");
    from_luma(&gray)
}

/// Copy a grayscale image into a matrix, one image row per matrix row.
pub fn from_luma(image: &GrayImage) -> Result<PixelMatrix> {
    let data = image.as_raw().iter().map(|&p| u16::from(p)).collect();
    PixelMatrix::from_flat(image.height() as usize, image.width() as usize, data)
}

/// Resample `matrix` to `num_rows × num_cols` with triangle (tent)
/// filtering, which is close to area averaging when downscaling.
pub fn resize(matrix: &PixelMatrix, num_rows: usize, num_cols: usize) -> Result<PixelMatrix> {
    if num_rows == 0 || num_cols == 0 {
        return Err(Error::matrix("can't resize to an empty matrix"));
    }
    if matrix.num_rows() == num_rows && matrix.num_cols() == num_cols {
        return Ok(matrix.clone());
    }

    let src: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(
        dimension(matrix.num_cols())?,
        dimension(matrix.num_rows())?,
        matrix.as_slice().to_vec(),
    )
    .ok_or_else(|| Error::matrix("matrix doesn't fit an image buffer"))?;

    let resized = imageops::resize(&src, dimension(num_cols)?, dimension(num_rows)?, FilterType::Triangle);
    PixelMatrix::from_flat(num_rows, num_cols, resized.into_raw())
}

/// Map values from `0..=source_max` onto `levels` evenly sized bins,
/// giving values in `0..levels`.
///
/// With `source_max = 255` and `levels = 16` this keeps the top four bits.
pub fn compress_levels(matrix: &PixelMatrix, source_max: u16, levels: u16) -> Result<PixelMatrix> {
    if levels == 0 {
        return Err(Error::config("need at least one level"));
    }
    let span = u32::from(source_max) + 1;
    let levels = u32::from(levels);
    let data = matrix
        .as_slice()
        .iter()
        .map(|&v| ((u32::from(v.min(source_max)) * levels / span) as u16))
        .collect();
    PixelMatrix::from_flat(matrix.num_rows(), matrix.num_cols(), data)
}

/// Load, convert, resize and quantize an image for `config`.
///
/// The image is scaled to the session's rows and columns. When the
/// session's `max_level` is below 255 the grayscale values are compressed to
/// `max_level + 1` levels.
pub fn load_for_session(path: impl AsRef<Path>, config: &SessionConfig) -> Result<PixelMatrix> {
    let full = load_grayscale(path)?;
    let sized = resize(&full, config.num_rows, config.num_cols)?;
    if config.max_level < GRAY_MAX {
        compress_levels(&sized, GRAY_MAX, config.max_level + 1)
    } else {
        Ok(sized)
    }
}

fn dimension(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| Error::matrix(format!("dimension {} is too large for an image", n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_to_sixteen_levels_keeps_top_bits() {
        let m = PixelMatrix::from_rows(vec![vec![0, 15, 16, 255]]).unwrap();
        let c = compress_levels(&m, 255, 16).unwrap();
        assert_eq!(c.as_slice(), &[0, 0, 1, 15]);
    }

    #[test]
    fn from_luma_keeps_layout() {
        let img = GrayImage::from_raw(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let m = from_luma(&img).unwrap();
        assert_eq!(m.num_rows(), 2);
        assert_eq!(m.num_cols(), 3);
        assert_eq!(m.row(1), &[4, 5, 6]);
    }

    #[test]
    fn resize_uniform_stays_uniform() {
        let m = PixelMatrix::from_flat(8, 8, vec![200; 64]).unwrap();
        let r = resize(&m, 4, 2).unwrap();
        assert_eq!(r.num_rows(), 4);
        assert_eq!(r.num_cols(), 2);
        assert!(r.as_slice().iter().all(|&v| v == 200));
    }
}
