//! In-memory sink for tests and offline analysis

use alloc::string::String;
use alloc::vec::Vec;

use crate::buffer::PcmFormat;
use crate::error::{Error, Result};
use crate::sink::{ensure_mono_i8, PlaybackSink};

/// Everything that happened to one opened line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRecord {
    pub format: PcmFormat,
    pub samples: Vec<i8>,
    /// Number of `write` calls
    pub writes: usize,
    pub drained: bool,
    pub closed: bool,
}

/// Handle to a [`MemorySink`] line (index into its records).
#[derive(Debug)]
pub struct MemoryLine(usize);

/// A sink that never blocks and keeps what it's given.
///
/// Useful for:
/// - Tests that check what was played
/// - Rendering without an audio device
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Vec<LineRecord>,
    /// Accept at most this many samples per write
    write_limit: Option<usize>,
    /// Make every `open` fail with this reason
    unavailable: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that takes at most `limit` samples per write, like a device
    /// with a small hardware buffer.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// A sink whose device is missing: every `open` fails.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    /// All lines opened so far, oldest first.
    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    /// The most recent line, if any.
    pub fn last_line(&self) -> Option<&LineRecord> {
        self.lines.last()
    }

    /// Lines that were opened but not yet closed.
    pub fn open_lines(&self) -> usize {
        self.lines.iter().filter(|l| !l.closed).count()
    }
}

impl PlaybackSink for MemorySink {
    type Line = MemoryLine;

    fn open(&mut self, format: &PcmFormat) -> Result<MemoryLine> {
        if let Some(reason) = &self.unavailable {
            return Err(Error::device(reason.clone()));
        }
        ensure_mono_i8(format)?;

        self.lines.push(LineRecord {
            format: *format,
            samples: Vec::new(),
            writes: 0,
            drained: false,
            closed: false,
        });
        Ok(MemoryLine(self.lines.len() - 1))
    }

    fn write(&mut self, line: &mut MemoryLine, samples: &[i8]) -> Result<usize> {
        let n = self.write_limit.map_or(samples.len(), |limit| limit.min(samples.len()));
        let record = &mut self.lines[line.0];
        if record.closed {
            return Err(Error::device("write to a closed line"));
        }
        record.samples.extend_from_slice(&samples[..n]);
        record.writes += 1;
        Ok(n)
    }

    fn drain(&mut self, line: &mut MemoryLine) -> Result<()> {
        self.lines[line.0].drained = true;
        Ok(())
    }

    fn close(&mut self, line: MemoryLine) {
        self.lines[line.0].closed = true;
    }
}
