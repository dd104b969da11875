//! Band-Pass Filter Bank
//!
//! Ten fixed octave-spaced bands, each a 2nd order IIR band-pass section.
//! The section output is added back onto the signal scaled by the band's
//! gain factor, so a band at 0 dB contributes nothing.
//!
//! Bands close to Nyquist are dropped entirely rather than filtered, since
//! the design becomes unstable as `tan(θQ/2)` approaches its pole.

use std::f32::consts::PI;

use crate::error::DspError;

/// Number of bands in the bank
pub const BAND_COUNT: usize = 10;

/// Band center frequencies (Hz), low to high
pub const BAND_FREQUENCIES: [f32; BAND_COUNT] = [
    31.25, 62.5, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

/// Human-readable band names, used as comments in the configuration file
pub const BAND_LABELS: [&str; BAND_COUNT] = [
    "31.25 Hz", "62.5 Hz", "125 Hz", "250 Hz", "500 Hz", "1 kHz", "2 kHz", "4 kHz", "8 kHz",
    "16 kHz",
];

/// Band-pass quality factor, sqrt(3/2).
///
/// Gives roughly 4 dB of suppression one octave either side of the center.
pub const Q: f32 = 1.224745;

/// Cutoff policy: a band is usable only while
/// `freq <= sample_rate / (CUTOFF_FACTOR * Q)`.
pub const CUTOFF_FACTOR: f32 = 2.005;

/// Fixed feed-forward tap shaping the notch of every band.
/// Not derived from the design parameter.
const NOTCH_TAP: f32 = -1.005;

/// Coefficients for one band-pass section
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterCoeffs {
    /// Feedback taps
    pub a: [f32; 2],
    /// Feed-forward taps
    pub b: [f32; 2],
}

impl FilterCoeffs {
    /// Design a band-pass section centered on `freq` for the given rate.
    ///
    /// Pure function of its inputs.
    pub fn design(freq: f32, sample_rate: f32, q: f32) -> Self {
        let theta = 2.0 * PI * freq / sample_rate;
        let t = (theta * q / 2.0).tan();
        let c = (1.0 - t) / (1.0 + t);

        Self {
            a: [(1.0 + c) * theta.cos(), -c],
            b: [(1.0 - c) / 2.0, NOTCH_TAP],
        }
    }
}

/// Number of bands that can be used at `sample_rate` (K).
///
/// Bands are dropped from the top while their center frequency exceeds
/// `sample_rate / (CUTOFF_FACTOR * Q)`.
pub fn active_band_count(sample_rate: u32) -> usize {
    let limit = sample_rate as f32 / (CUTOFF_FACTOR * Q);
    let mut k = BAND_COUNT;
    while k > 0 && BAND_FREQUENCIES[k - 1] > limit {
        k -= 1;
    }
    k
}

/// Coefficients for every active band at one sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    coeffs: [FilterCoeffs; BAND_COUNT],
    active: usize,
    sample_rate: u32,
}

impl FilterBank {
    /// Build the bank for a sample rate.
    ///
    /// Bands at or above K keep zeroed coefficients and are never run.
    pub fn new(sample_rate: u32) -> Result<Self, DspError> {
        if sample_rate == 0 {
            return Err(DspError::InvalidSampleRate(sample_rate));
        }

        let active = active_band_count(sample_rate);
        let mut coeffs = [FilterCoeffs::default(); BAND_COUNT];
        for (k, c) in coeffs.iter_mut().enumerate().take(active) {
            *c = FilterCoeffs::design(BAND_FREQUENCIES[k], sample_rate as f32, Q);
        }

        Ok(Self {
            coeffs,
            active,
            sample_rate,
        })
    }

    /// Coefficients of the active bands, low to high
    #[inline]
    pub fn active_coeffs(&self) -> &[FilterCoeffs] {
        &self.coeffs[..self.active]
    }

    /// Active band count (K)
    pub fn active_bands(&self) -> usize {
        self.active
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
