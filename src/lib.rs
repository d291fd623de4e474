//! Bildklang - turn pixel matrices into sound
//!
//! Every matrix row is assigned a fixed frequency, highest at the top. Every
//! pixel weights its row's sinusoid during its column's slice of time, and
//! the weighted sinusoids are summed into 8-bit signed mono PCM.
//!
//! Design principles:
//! - Tables are built once per parameter set ([`Session`]); synthesis only reads them
//! - Synthesis is pure and deterministic; clipping is a silent hard limit
//! - Sinks are a trait; lines are always drained and closed ([`Playback`])
//! - Cancellation is an explicit token, checked between chunks
//!
//! # Example
//!
//! ```
//! use bildklang::{CancelToken, PixelMatrix, Session, SessionConfig};
//! use bildklang::sink::MemorySink;
//!
//! let config = SessionConfig::default()
//!     .with_dimensions(8, 8)
//!     .with_max_level(15)
//!     .with_normalized_levels();
//! let mut session = Session::new(config).unwrap();
//!
//! let matrix = PixelMatrix::zeros(8, 8).unwrap();
//! let buffer = session.synthesize(&matrix).unwrap();
//! assert!(buffer.samples().iter().all(|&s| s == 0));
//!
//! let mut sink = MemorySink::new();
//! session.play(&buffer, &mut sink, &CancelToken::new()).unwrap();
//! assert!(sink.last_line().unwrap().closed);
//! ```
//!
//! # Features
//!
//! - `cpal_sink` - [`sink::CpalSink`], playback through the system audio device
//! - `image_src` - [`acquire`], loading image files as matrices
//! - `serde` - (de)serializing [`SessionConfig`]

extern crate alloc;

mod buffer;
mod cancel;
mod config;
mod error;
mod frequency;
mod matrix;
mod playback;
mod session;
mod sine_table;
mod synth;
pub mod sink;

#[cfg(feature = "image_src")]
pub mod acquire;

pub use buffer::{AudioBuffer, PcmFormat};
pub use cancel::CancelToken;
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use frequency::FrequencyTable;
pub use matrix::PixelMatrix;
pub use playback::{play, play_chunked, Playback, PlaybackOutcome, DEFAULT_CHUNK_SIZE};
pub use session::{Performance, Session, SessionState};
pub use sine_table::SineTable;
pub use synth::{quantize, synthesize};
