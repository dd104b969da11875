//! DSP Error Types

use thiserror::Error;

/// Errors that can occur while setting up the equalizer for a stream
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Invalid band index: {0} (must be 0-9)")]
    InvalidBandIndex(usize),

    #[error("Sample rate must be positive, got {0}")]
    InvalidSampleRate(u32),

    #[error("Stream must have at least one channel")]
    NoChannels,

    #[error("Too many channels: {channels} (maximum is {max})")]
    TooManyChannels { channels: usize, max: usize },
}
