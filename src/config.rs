//! Session parameters.

use alloc::format;

use crate::buffer::PcmFormat;
use crate::error::{Error, Result};

/// Parameters fixed for the lifetime of a [`Session`](crate::Session).
///
/// Starts from the defaults below and is adjusted with the `with_*` builders:
///
/// | field              | default |
/// |--------------------|---------|
/// | `num_rows`         | 64      |
/// | `num_cols`         | 64      |
/// | `min_frequency`    | 200 Hz  |
/// | `max_frequency`    | 4000 Hz |
/// | `sample_rate`      | 44100   |
/// | `max_level`        | 255     |
/// | `level_scale`      | 1.0     |
/// | `normalize_levels` | false   |
/// | `chunk_size`       | 1024    |
///
/// ```
/// use bildklang::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_dimensions(32, 48)
///     .with_frequency_range(110.0, 1760.0)
///     .with_max_level(15)
///     .with_normalized_levels();
///
/// assert_eq!(config.samples_per_frame(), 44100 / 32);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Matrix rows, one frequency each. At least 2.
    pub num_rows: usize,
    /// Matrix columns, one audio frame each.
    pub num_cols: usize,
    /// Frequency of the last row, in Hz.
    pub min_frequency: f64,
    /// Frequency of row 0, in Hz.
    pub max_frequency: f64,
    pub sample_rate: u32,
    /// Highest pixel value a matrix may hold (e.g. 15 or 255).
    pub max_level: u16,
    /// Multiplier applied to every pixel before it weights its sinusoid.
    /// Ignored while `normalize_levels` is set.
    pub level_scale: f64,
    /// Weigh pixels by `1 / max_level` instead of `level_scale`.
    pub normalize_levels: bool,
    /// Samples per write when handing audio to a sink.
    pub chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            num_rows: 64,
            num_cols: 64,
            min_frequency: 200.0,
            max_frequency: 4000.0,
            sample_rate: 44_100,
            max_level: 255,
            level_scale: 1.0,
            normalize_levels: false,
            chunk_size: 1024,
        }
    }
}

impl SessionConfig {
    pub fn with_dimensions(mut self, num_rows: usize, num_cols: usize) -> Self {
        self.num_rows = num_rows;
        self.num_cols = num_cols;
        self
    }

    pub fn with_frequency_range(mut self, min_frequency: f64, max_frequency: f64) -> Self {
        self.min_frequency = min_frequency;
        self.max_frequency = max_frequency;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_level(mut self, max_level: u16) -> Self {
        self.max_level = max_level;
        self
    }

    /// Use a fixed pixel multiplier, replacing any earlier
    /// [`with_normalized_levels`](Self::with_normalized_levels).
    pub fn with_level_scale(mut self, level_scale: f64) -> Self {
        self.level_scale = level_scale;
        self.normalize_levels = false;
        self
    }

    /// Scale pixels by `1 / max_level` so a full-intensity pixel weighs 1.0.
    ///
    /// The scale follows whatever `max_level` ends up being, so this can be
    /// called before or after [`with_max_level`](Self::with_max_level).
    pub fn with_normalized_levels(mut self) -> Self {
        self.normalize_levels = true;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// `sample_rate / num_rows`, truncated.
    #[inline]
    pub fn samples_per_frame(&self) -> usize {
        match self.num_rows {
            0 => 0,
            rows => self.sample_rate as usize / rows,
        }
    }

    /// The multiplier synthesis actually applies to pixels.
    #[inline]
    pub fn effective_level_scale(&self) -> f64 {
        if self.normalize_levels {
            1.0 / f64::from(self.max_level.max(1))
        } else {
            self.level_scale
        }
    }

    /// Length of every buffer this configuration synthesizes.
    ///
    /// Saturates for sizes [`validate`](Self::validate) rejects.
    #[inline]
    pub fn buffer_len(&self) -> usize {
        self.num_cols.saturating_mul(self.samples_per_frame())
    }

    #[inline]
    pub fn format(&self) -> PcmFormat {
        PcmFormat::mono_i8(self.sample_rate)
    }

    /// Check everything table building relies on.
    ///
    /// Frequency bounds are checked again by
    /// [`FrequencyTable::compute`](crate::FrequencyTable::compute).
    pub fn validate(&self) -> Result<()> {
        if self.num_rows < 2 {
            return Err(Error::config(format!("need at least 2 rows, got {}", self.num_rows)));
        }
        if self.num_cols == 0 {
            return Err(Error::config("need at least 1 column"));
        }
        if self.sample_rate == 0 {
            return Err(Error::config("sample rate must be positive"));
        }
        if self.samples_per_frame() == 0 {
            return Err(Error::config(format!(
                "sample rate {} is below the row count {}, frames would be empty",
                self.sample_rate, self.num_rows
            )));
        }
        let table_len = self
            .num_cols
            .checked_mul(self.samples_per_frame())
            .and_then(|len| len.checked_mul(self.num_rows));
        if table_len.is_none() {
            return Err(Error::config(format!(
                "{} rows x {} columns x {} samples per frame is too large",
                self.num_rows,
                self.num_cols,
                self.samples_per_frame()
            )));
        }
        if !self.min_frequency.is_finite() || !self.max_frequency.is_finite() {
            return Err(Error::config("frequency bounds must be finite"));
        }
        if self.min_frequency < 0.0 {
            return Err(Error::config(format!("negative minimum frequency {}", self.min_frequency)));
        }
        if self.max_frequency < self.min_frequency {
            return Err(Error::config(format!(
                "maximum frequency {} is below minimum frequency {}",
                self.max_frequency, self.min_frequency
            )));
        }
        if self.max_level == 0 {
            return Err(Error::config("quantization range must allow at least one non-zero level"));
        }
        let level_scale = self.effective_level_scale();
        if !level_scale.is_finite() || level_scale < 0.0 {
            return Err(Error::config(format!("level scale {} is not a finite, non-negative number", level_scale)));
        }
        if self.chunk_size == 0 {
            return Err(Error::config("chunk size must be positive"));
        }
        Ok(())
    }

    /// True when switching from `self` to `other` needs new tables.
    /// Level range, scale and chunk size don't affect the tables.
    pub(crate) fn tables_differ(&self, other: &SessionConfig) -> bool {
        self.num_rows != other.num_rows
            || self.num_cols != other.num_cols
            || self.sample_rate != other.sample_rate
            || self.min_frequency.to_bits() != other.min_frequency.to_bits()
            || self.max_frequency.to_bits() != other.max_frequency.to_bits()
    }
}
