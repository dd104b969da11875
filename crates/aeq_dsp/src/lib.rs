//! AEq DSP - Digital Signal Processing Module
//!
//! This crate provides the audio processing core for AEq, including:
//! - 10-band graphic equalizer built from IIR band-pass sections
//! - Per-band, per-channel gain factors with a uniform preamp
//! - Adaptive limiter protecting fixed-range (integer) output
//! - Zero-allocation processing path
//!
//! # Architecture
//!
//! The DSP chain follows a strict "no allocation in audio callback" rule.
//! Settings are swapped in whole between buffer processing calls.
//!
//! ```text
//! EqConfig ──▶ GainTable ─┐
//!                          ▼
//! input ──▶ band 0 ──▶ band 1 ──▶ … ──▶ band K-1 ──▶ (Limiter) ──▶ output
//!             ▲          ▲                 ▲
//!             └──── FilterBank (per sample rate) ────┘
//! ```

mod eq;
mod error;
mod filter;
mod gain;
mod limiter;
mod sample;
mod state;

pub use eq::{EqConfig, Equalizer, StreamFormat, MAX_CHANNELS, MAX_GAIN_DB};
pub use error::DspError;
pub use filter::{
    active_band_count, FilterBank, FilterCoeffs, BAND_COUNT, BAND_FREQUENCIES, BAND_LABELS,
    CUTOFF_FACTOR, Q,
};
pub use gain::{gain_factor, GainTable};
pub use limiter::{Limiter, RECOVERY_PER_SAMPLE};
pub use sample::Sample;
pub use state::ChannelState;
