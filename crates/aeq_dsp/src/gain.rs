//! Per-band, per-channel gain factors

use crate::eq::{EqConfig, MAX_CHANNELS};
use crate::filter::BAND_COUNT;

/// Linear factor applied to a band's filtered contribution.
///
/// `10^(db/20) - 1`: the section output is added on top of the dry signal,
/// so unity (0 dB) maps to exactly 0.
#[inline]
pub fn gain_factor(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0) - 1.0
}

/// Gain factors for every channel and band.
///
/// Built whole from an [`EqConfig`] and swapped in as a single value, so
/// the processing path never sees a half-updated table.
#[derive(Debug, Clone, PartialEq)]
pub struct GainTable {
    gains: [[f32; BAND_COUNT]; MAX_CHANNELS],
}

impl GainTable {
    /// All bands at 0 dB
    pub fn flat() -> Self {
        Self {
            gains: [[0.0; BAND_COUNT]; MAX_CHANNELS],
        }
    }

    /// Every channel currently gets the same curve.
    pub fn from_config(config: &EqConfig) -> Self {
        let row: [f32; BAND_COUNT] =
            core::array::from_fn(|k| gain_factor(config.preamp_db + config.gains_db[k]));

        Self {
            gains: [row; MAX_CHANNELS],
        }
    }

    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32; BAND_COUNT] {
        &self.gains[channel]
    }
}

impl Default for GainTable {
    fn default() -> Self {
        Self::flat()
    }
}
