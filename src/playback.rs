//! Handing a synthesized buffer to a sink.

use alloc::format;

use tracing::{debug, trace, warn};

use crate::buffer::{AudioBuffer, PcmFormat};
use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::sink::PlaybackSink;

/// Samples per `write` unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// How a playback cycle ended. Errors are reported separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The whole buffer was written and drained.
    Completed { written: usize },
    /// The cancel token fired; `written` samples made it to the line.
    Cancelled { written: usize },
}

impl PlaybackOutcome {
    #[inline]
    pub fn written(&self) -> usize {
        match *self {
            PlaybackOutcome::Completed { written } | PlaybackOutcome::Cancelled { written } => written,
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PlaybackOutcome::Cancelled { .. })
    }
}

/// An open line on a sink.
///
/// Opening acquires the line; dropping a `Playback` that wasn't
/// [`finish`](Self::finish)ed still drains and closes it, so the line is
/// released on early returns and panics alike.
pub struct Playback<'s, S: PlaybackSink> {
    sink: &'s mut S,
    line: Option<S::Line>,
    written: usize,
    drained: bool,
}

impl<'s, S: PlaybackSink> Playback<'s, S> {
    /// Open a line on `sink` for `format`.
    pub fn open(sink: &'s mut S, format: &PcmFormat) -> Result<Self> {
        let line = sink.open(format)?;
        debug!(sample_rate = format.sample_rate, "line opened");
        Ok(Self {
            sink,
            line: Some(line),
            written: 0,
            drained: false,
        })
    }

    /// Samples written so far.
    #[inline]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Write `samples` in chunks of at most `chunk_size`, checking `cancel`
    /// before each chunk.
    pub fn write_chunks(&mut self, samples: &[i8], chunk_size: usize, cancel: &CancelToken) -> Result<PlaybackOutcome> {
        if chunk_size == 0 {
            return Err(Error::config("chunk size must be positive"));
        }
        let Some(line) = self.line.as_mut() else {
            return Err(Error::device("line already closed"));
        };

        let mut sent = 0;
        for chunk in samples.chunks(chunk_size) {
            if cancel.is_cancelled() {
                warn!(written = self.written, remaining = samples.len() - sent, "playback cancelled");
                return Ok(PlaybackOutcome::Cancelled { written: self.written });
            }

            let mut rest = chunk;
            while !rest.is_empty() {
                let n = self.sink.write(line, rest)?;
                if n == 0 {
                    return Err(Error::device("line accepted no samples"));
                }
                if n > rest.len() {
                    return Err(Error::device(format!(
                        "line reported {} samples written out of {}",
                        n,
                        rest.len()
                    )));
                }
                self.written += n;
                sent += n;
                rest = &rest[n..];
            }
            trace!(written = self.written, "chunk written");
        }

        Ok(PlaybackOutcome::Completed { written: self.written })
    }

    /// Block until the line has played everything written.
    pub fn drain(&mut self) -> Result<()> {
        if self.drained {
            return Ok(());
        }
        let Some(line) = self.line.as_mut() else {
            return Ok(());
        };
        self.drained = true;
        self.sink.drain(line)
    }

    /// Drain (if not done yet) and close the line.
    pub fn finish(mut self) -> Result<()> {
        let drained = self.drain();
        self.close();
        drained
    }

    fn close(&mut self) {
        if let Some(line) = self.line.take() {
            self.sink.close(line);
            debug!(written = self.written, "line closed");
        }
    }
}

impl<S: PlaybackSink> Drop for Playback<'_, S> {
    fn drop(&mut self) {
        if self.line.is_some() {
            if let Err(e) = self.drain() {
                warn!("drain failed while releasing line: {}", e);
            }
            self.close();
        }
    }
}

/// Play `buffer` on `sink` in [`DEFAULT_CHUNK_SIZE`] chunks.
///
/// See [`play_chunked`].
pub fn play<S: PlaybackSink>(buffer: &AudioBuffer, sink: &mut S, cancel: &CancelToken) -> Result<PlaybackOutcome> {
    play_chunked(buffer, sink, cancel, DEFAULT_CHUNK_SIZE)
}

/// Open a line, write `buffer` in chunks of `chunk_size`, drain, close.
///
/// The line is always drained and closed before this returns: after
/// success, after cancellation (reported as [`PlaybackOutcome::Cancelled`])
/// and after a write error (returned after the line is released). A failure
/// to open is returned as is. The buffer is only borrowed, so it can be
/// played again after any of these.
pub fn play_chunked<S: PlaybackSink>(
    buffer: &AudioBuffer,
    sink: &mut S,
    cancel: &CancelToken,
    chunk_size: usize,
) -> Result<PlaybackOutcome> {
    if chunk_size == 0 {
        return Err(Error::config("chunk size must be positive"));
    }

    let mut playback = Playback::open(sink, &buffer.format())?;
    let outcome = playback.write_chunks(buffer.samples(), chunk_size, cancel);
    let finished = playback.finish();

    let outcome = outcome?;
    finished?;
    Ok(outcome)
}
