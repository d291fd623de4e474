//! Playback sinks.
//!
//! A [`PlaybackSink`] is whatever finally consumes synthesized PCM. The
//! engine drives it through four calls: [`open`](PlaybackSink::open) a line
//! for a format, [`write`](PlaybackSink::write) samples in chunks,
//! [`drain`](PlaybackSink::drain) until everything was consumed, then
//! [`close`](PlaybackSink::close) the line. [`Playback`](crate::Playback)
//! makes sure drain and close happen on every exit path.
//!
//! Built-in sinks:
//! - [`MemorySink`] - Keeps every line's samples in memory (tests, analysis)
//! - [`RtrbSink`] - Pushes samples into an rtrb ring buffer for another thread
//! - [`CpalSink`] - Plays through the system audio device (requires `cpal_sink` feature)

mod memory;
mod rtrb_sink;

#[cfg(feature = "cpal_sink")]
mod cpal_sink;

pub use memory::{LineRecord, MemoryLine, MemorySink};
pub use rtrb_sink::{RtrbLine, RtrbSink};

#[cfg(feature = "cpal_sink")]
pub use cpal_sink::{CpalLine, CpalSink};

use crate::buffer::PcmFormat;
use crate::error::Result;

/// A consumer of 8-bit signed PCM, usually an audio device.
///
/// The sink is shared by the whole process; callers serialize access so at
/// most one line is open and written to at a time.
pub trait PlaybackSink {
    /// An opened line. Returned by `open` and handed back to every other call.
    type Line;

    /// Open a line for `format`.
    ///
    /// Fails with [`Error::DeviceUnavailable`](crate::Error::DeviceUnavailable)
    /// if there's no device or it can't play the format.
    fn open(&mut self, format: &PcmFormat) -> Result<Self::Line>;

    /// Write some prefix of `samples`, returning how many were taken.
    ///
    /// May block until the line has room. Returning `Ok(0)` for a non-empty
    /// slice is treated as a stalled line.
    fn write(&mut self, line: &mut Self::Line, samples: &[i8]) -> Result<usize>;

    /// Block until everything written has been consumed.
    fn drain(&mut self, line: &mut Self::Line) -> Result<()>;

    /// Release the line.
    fn close(&mut self, line: Self::Line);
}

impl<S: PlaybackSink + ?Sized> PlaybackSink for &mut S {
    type Line = S::Line;

    fn open(&mut self, format: &PcmFormat) -> Result<Self::Line> {
        (**self).open(format)
    }

    fn write(&mut self, line: &mut Self::Line, samples: &[i8]) -> Result<usize> {
        (**self).write(line, samples)
    }

    fn drain(&mut self, line: &mut Self::Line) -> Result<()> {
        (**self).drain(line)
    }

    fn close(&mut self, line: Self::Line) {
        (**self).close(line)
    }
}

/// Only 8-bit signed mono is ever produced; sinks use this to reject the rest.
pub(crate) fn ensure_mono_i8(format: &PcmFormat) -> Result<()> {
    if format.bits_per_sample != 8 || format.channels != 1 || !format.signed {
        return Err(crate::Error::device(alloc::format!("unsupported PCM format {:?}", format)));
    }
    if format.sample_rate == 0 {
        return Err(crate::Error::device("sample rate must be positive"));
    }
    Ok(())
}
