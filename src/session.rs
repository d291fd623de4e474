//! A configured sonification session.

use alloc::format;

use tracing::debug;

use crate::buffer::{AudioBuffer, PcmFormat};
use crate::cancel::CancelToken;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::matrix::PixelMatrix;
use crate::playback::{Playback, PlaybackOutcome};
use crate::sine_table::SineTable;
use crate::sink::PlaybackSink;
use crate::synth;

/// Where a session is in its synthesize/play cycle.
///
/// `Configured` is entered once per parameter set; every later cycle moves
/// through `Synthesizing → Buffered → Playing → Drained → Closed` and the
/// next one starts again from there. `Idle` is only seen while tables are
/// being rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Configured,
    Synthesizing,
    Buffered,
    Playing,
    Drained,
    Closed,
}

/// A buffer together with how playing it went.
///
/// Device failures land in `playback` so the synthesized buffer survives
/// them and can be played again.
#[derive(Debug)]
pub struct Performance {
    pub buffer: AudioBuffer,
    pub playback: Result<PlaybackOutcome>,
}

/// One parameter set with its frequency and sine tables built.
///
/// The tables are built once, by [`new`](Self::new) or by a
/// [`reconfigure`](Self::reconfigure) that changes them, and are reused for
/// every matrix synthesized afterwards.
///
/// ```
/// use bildklang::{CancelToken, PixelMatrix, Session, SessionConfig};
/// use bildklang::sink::MemorySink;
///
/// let config = SessionConfig::default()
///     .with_dimensions(4, 2)
///     .with_frequency_range(1000.0, 4000.0)
///     .with_sample_rate(8);
/// let mut session = Session::new(config).unwrap();
///
/// let mut matrix = PixelMatrix::zeros(4, 2).unwrap();
/// matrix.set(0, 0, 1);
///
/// let mut sink = MemorySink::new();
/// let performance = session.generate_and_play(&matrix, &mut sink, &CancelToken::new()).unwrap();
/// assert_eq!(performance.buffer.len(), 4);
/// assert!(performance.playback.is_ok());
/// ```
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    frequencies: FrequencyTable,
    table: SineTable,
    state: SessionState,
}

impl Session {
    /// Validate `config` and build its tables.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let (frequencies, table) = build_tables(&config)?;
        Ok(Self {
            config,
            frequencies,
            table,
            state: SessionState::Configured,
        })
    }

    /// Switch to `config`, rebuilding the tables only if rows, columns,
    /// sample rate or frequency bounds changed. Returns whether they were
    /// rebuilt.
    ///
    /// An invalid `config` is rejected and the current parameters stay in
    /// effect.
    pub fn reconfigure(&mut self, config: SessionConfig) -> Result<bool> {
        config.validate()?;

        if !self.config.tables_differ(&config) {
            self.config = config;
            return Ok(false);
        }

        self.state = SessionState::Idle;
        match build_tables(&config) {
            Ok((frequencies, table)) => {
                self.config = config;
                self.frequencies = frequencies;
                self.table = table;
                self.state = SessionState::Configured;
                Ok(true)
            }
            Err(e) => {
                self.state = SessionState::Configured;
                Err(e)
            }
        }
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn frequencies(&self) -> &FrequencyTable {
        &self.frequencies
    }

    #[inline]
    pub fn sine_table(&self) -> &SineTable {
        &self.table
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn samples_per_frame(&self) -> usize {
        self.table.samples_per_frame()
    }

    #[inline]
    pub fn format(&self) -> PcmFormat {
        self.config.format()
    }

    /// Render `matrix` with this session's tables and level scale.
    ///
    /// Besides the shape check done by [`synthesize`](crate::synthesize),
    /// values above the session's `max_level` are rejected.
    pub fn synthesize(&mut self, matrix: &PixelMatrix) -> Result<AudioBuffer> {
        let max = matrix.max_value();
        if max > self.config.max_level {
            return Err(Error::matrix(format!(
                "value {} is outside the quantization range 0..={}",
                max, self.config.max_level
            )));
        }

        let resting = self.state;
        self.state = SessionState::Synthesizing;
        match synth::synthesize(matrix, &self.table, self.config.effective_level_scale()) {
            Ok(buffer) => {
                self.state = SessionState::Buffered;
                Ok(buffer)
            }
            Err(e) => {
                self.state = resting;
                Err(e)
            }
        }
    }

    /// Play `buffer` on `sink` using the session's chunk size.
    ///
    /// The line is drained and closed on every path; see
    /// [`play_chunked`](crate::play_chunked).
    pub fn play<S: PlaybackSink>(
        &mut self,
        buffer: &AudioBuffer,
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Result<PlaybackOutcome> {
        let resting = self.state;
        let mut playback = match Playback::open(sink, &buffer.format()) {
            Ok(p) => p,
            Err(e) => {
                self.state = resting;
                return Err(e);
            }
        };

        self.state = SessionState::Playing;
        let outcome = playback.write_chunks(buffer.samples(), self.config.chunk_size, cancel);

        let drained = playback.drain();
        self.state = SessionState::Drained;
        let closed = playback.finish();
        self.state = SessionState::Closed;

        let outcome = outcome?;
        drained?;
        closed?;
        debug!(?outcome, "playback finished");
        Ok(outcome)
    }

    /// Synthesize `matrix` and play the result.
    ///
    /// Configuration and matrix errors are returned directly, with no
    /// buffer. Anything that goes wrong during playback is reported in
    /// [`Performance::playback`] next to the buffer.
    pub fn generate_and_play<S: PlaybackSink>(
        &mut self,
        matrix: &PixelMatrix,
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Result<Performance> {
        let buffer = self.synthesize(matrix)?;
        let playback = self.play(&buffer, sink, cancel);
        Ok(Performance { buffer, playback })
    }
}

fn build_tables(config: &SessionConfig) -> Result<(FrequencyTable, SineTable)> {
    config.validate()?;

    let frequencies = FrequencyTable::compute(config.num_rows, config.min_frequency, config.max_frequency)?;
    let samples_per_frame = config.samples_per_frame();
    let table = SineTable::build(&frequencies, config.num_cols, samples_per_frame, config.sample_rate);

    debug!(
        rows = config.num_rows,
        cols = config.num_cols,
        samples_per_frame,
        sample_rate = config.sample_rate,
        "tables built"
    );
    Ok((frequencies, table))
}
