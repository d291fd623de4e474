//! Synthesized PCM and its format descriptor.

use alloc::vec::Vec;
use core::time::Duration;

/// Describes raw PCM handed to a [`PlaybackSink`](crate::sink::PlaybackSink).
///
/// The engine only ever produces 8-bit signed mono, but sinks receive the
/// full descriptor so they can reject formats they can't play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
    pub signed: bool,
}

impl PcmFormat {
    /// 8-bit signed mono at `sample_rate`.
    pub const fn mono_i8(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            bits_per_sample: 8,
            channels: 1,
            signed: true,
        }
    }
}

/// One synthesis pass worth of 8-bit signed mono samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioBuffer {
    samples: Vec<i8>,
    format: PcmFormat,
}

impl AudioBuffer {
    pub(crate) fn new(samples: Vec<i8>, format: PcmFormat) -> Self {
        Self { samples, format }
    }

    #[inline]
    pub fn samples(&self) -> &[i8] {
        &self.samples
    }

    #[inline]
    pub fn format(&self) -> PcmFormat {
        self.format
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Exact playback length. Because samples per frame are truncated this
    /// can be slightly shorter than `num_cols / num_rows` seconds.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.format.sample_rate))
    }

    /// Samples reinterpreted as two's-complement bytes, as an 8-bit signed
    /// PCM line expects them.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.samples.iter().map(|&s| s as u8).collect()
    }

    /// Give up the samples.
    pub fn into_samples(self) -> Vec<i8> {
        self.samples
    }
}

impl AsRef<[i8]> for AudioBuffer {
    fn as_ref(&self) -> &[i8] {
        &self.samples
    }
}
