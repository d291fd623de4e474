//! Error types.

use alloc::string::String;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Everything that can go wrong while configuring a session, synthesizing,
/// or handing audio to a sink.
///
/// Clipping is not an error: out-of-range sums saturate silently. A cancelled
/// playback is reported through [`PlaybackOutcome`](crate::PlaybackOutcome),
/// not through this type.
#[derive(Debug, Error)]
pub enum Error {
    /// Session parameters can't produce valid tables.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// The pixel matrix is empty, ragged, the wrong shape for the tables,
    /// or holds a value outside the session's quantization range.
    #[error("invalid matrix: {reason}")]
    InvalidMatrix { reason: String },

    /// The output device couldn't be opened or written to.
    #[error("audio device unavailable: {reason}")]
    DeviceUnavailable { reason: String },

    /// Image decoding failed.
    #[cfg(feature = "image_src")]
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration { reason: reason.into() }
    }

    pub fn matrix(reason: impl Into<String>) -> Self {
        Self::InvalidMatrix { reason: reason.into() }
    }

    pub fn device(reason: impl Into<String>) -> Self {
        Self::DeviceUnavailable { reason: reason.into() }
    }
}
