//! 10-Band Graphic Equalizer
//!
//! Runs a serial cascade of band-pass sections over interleaved blocks.
//! Each band's filtered signal, scaled by its gain factor, is added onto the
//! running signal before it reaches the next band.
//!
//! One `Equalizer` serves exactly one stream. It owns that stream's delay
//! memory and limiter state; nothing is shared between instances.

use crate::error::DspError;
use crate::filter::{FilterBank, FilterCoeffs, BAND_COUNT};
use crate::gain::GainTable;
use crate::sample::Sample;
use crate::state::ChannelState;

/// Maximum channels per stream
pub const MAX_CHANNELS: usize = 10;

/// Gain range accepted by the setters (dB)
pub const MAX_GAIN_DB: f32 = 24.0;

/// Stream shape the equalizer is set up for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: usize,
}

impl StreamFormat {
    pub fn new(sample_rate: u32, channels: usize) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Check the format can be served
    pub fn validate(&self) -> Result<(), DspError> {
        if self.sample_rate == 0 {
            return Err(DspError::InvalidSampleRate(self.sample_rate));
        }
        if self.channels == 0 {
            return Err(DspError::NoChannels);
        }
        if self.channels > MAX_CHANNELS {
            return Err(DspError::TooManyChannels {
                channels: self.channels,
                max: MAX_CHANNELS,
            });
        }
        Ok(())
    }
}

/// User-facing equalizer settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqConfig {
    pub enabled: bool,
    /// Per-band gain in dB, low to high
    pub gains_db: [f32; BAND_COUNT],
    /// Uniform gain added to every band (dB)
    pub preamp_db: f32,
}

impl Default for EqConfig {
    /// Disabled and flat
    fn default() -> Self {
        Self {
            enabled: false,
            gains_db: [0.0; BAND_COUNT],
            preamp_db: 0.0,
        }
    }
}

impl EqConfig {
    /// Set gain for a specific band (0-9), clamped to ±24 dB
    pub fn set_band_gain(&mut self, band_index: usize, gain_db: f32) -> Result<(), DspError> {
        if band_index >= BAND_COUNT {
            return Err(DspError::InvalidBandIndex(band_index));
        }
        self.gains_db[band_index] = gain_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB);
        Ok(())
    }

    /// Set the preamp, clamped to ±24 dB
    pub fn set_preamp(&mut self, preamp_db: f32) {
        self.preamp_db = preamp_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB);
    }
}

/// The per-stream equalizer processor
///
/// Designed for real-time use: `process()` and `process_in_place()` never
/// allocate, block, or fail.
pub struct Equalizer {
    bank: FilterBank,
    gains: GainTable,
    channels: Vec<ChannelState>,
    enabled: bool,
    format: StreamFormat,
}

impl Equalizer {
    /// Create an equalizer for a stream, disabled and flat
    pub fn new(format: StreamFormat) -> Result<Self, DspError> {
        Self::with_config(format, &EqConfig::default())
    }

    pub fn with_config(format: StreamFormat, config: &EqConfig) -> Result<Self, DspError> {
        format.validate()?;

        Ok(Self {
            bank: FilterBank::new(format.sample_rate)?,
            gains: GainTable::from_config(config),
            channels: vec![ChannelState::new(); format.channels],
            enabled: config.enabled,
            format,
        })
    }

    /// Re-establish the stream format.
    ///
    /// Recomputes coefficients and the active band count and zeroes all
    /// channel state. Allocates; call outside the audio callback.
    pub fn set_format(&mut self, format: StreamFormat) -> Result<(), DspError> {
        format.validate()?;

        self.bank = FilterBank::new(format.sample_rate)?;
        self.channels.clear();
        self.channels.resize(format.channels, ChannelState::new());
        self.format = format;
        Ok(())
    }

    /// Swap in new settings.
    ///
    /// The gain table is built first and replaces the old one whole.
    /// Limiter attenuation returns to unity on every channel. A channel whose
    /// delay memory overflowed under the previous settings is cleared.
    pub fn apply_config(&mut self, config: &EqConfig) {
        let gains = GainTable::from_config(config);
        self.gains = gains;
        self.enabled = config.enabled;

        for channel in &mut self.channels {
            if channel.is_finite() {
                channel.limiter_mut().reset();
            } else {
                channel.reset();
            }
        }
    }

    /// Process an interleaved block into a separate output buffer
    ///
    /// Handles as many whole frames as both buffers hold and returns that
    /// count. Output samples past the last whole frame are left untouched.
    ///
    /// # Real-time Safety
    /// No allocations, no syscalls. O(frames × channels × K).
    pub fn process<S: Sample>(&mut self, input: &[S], output: &mut [S]) -> usize {
        let width = self.format.channels;
        let frames = input.len().min(output.len()) / width;
        let len = frames * width;

        if !self.enabled {
            output[..len].copy_from_slice(&input[..len]);
            return frames;
        }

        let coeffs = self.bank.active_coeffs();
        for (in_frame, out_frame) in input[..len]
            .chunks_exact(width)
            .zip(output[..len].chunks_exact_mut(width))
        {
            for (ch, state) in self.channels.iter_mut().enumerate() {
                out_frame[ch] = render(state, coeffs, self.gains.channel(ch), in_frame[ch]);
            }
        }

        frames
    }

    /// Process an interleaved block in place
    ///
    /// # Real-time Safety
    /// No allocations, no syscalls. O(frames × channels × K).
    pub fn process_in_place<S: Sample>(&mut self, buffer: &mut [S]) -> usize {
        let width = self.format.channels;
        let frames = buffer.len() / width;

        if !self.enabled {
            return frames;
        }

        let coeffs = self.bank.active_coeffs();
        for frame in buffer.chunks_exact_mut(width) {
            for (ch, state) in self.channels.iter_mut().enumerate() {
                frame[ch] = render(state, coeffs, self.gains.channel(ch), frame[ch]);
            }
        }

        frames
    }

    /// Clear delay memory and limiter state on every channel
    ///
    /// Call when switching audio sources to prevent filter ringing
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Active band count (K) at the current sample rate
    pub fn active_bands(&self) -> usize {
        self.bank.active_bands()
    }

    pub fn gain_table(&self) -> &GainTable {
        &self.gains
    }

    pub fn channel_state(&self, channel: usize) -> Option<&ChannelState> {
        self.channels.get(channel)
    }
}

/// Filter one sample and convert it to the output format.
///
/// Fixed-range formats go through the channel's limiter; others are stored
/// as computed.
#[inline]
fn render<S: Sample>(
    state: &mut ChannelState,
    coeffs: &[FilterCoeffs],
    gains: &[f32; BAND_COUNT],
    sample: S,
) -> S {
    let f = state.filter(coeffs, gains, sample.to_f32());

    match S::RANGE {
        Some((min, max)) => S::from_f32(state.limiter_mut().limit(f, min, max)),
        None => S::from_f32(f),
    }
}
