//! Per-channel stream state

use crate::filter::{FilterCoeffs, BAND_COUNT};
use crate::limiter::Limiter;

/// Delay memory and limiter attenuation for one channel.
///
/// Lives as long as the stream's format does; zeroed on any format change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelState {
    /// `(w[n-1], w[n-2])` per band
    memory: [[f32; 2]; BAND_COUNT],
    limiter: Limiter,
}

impl ChannelState {
    pub fn new() -> Self {
        Self {
            memory: [[0.0; 2]; BAND_COUNT],
            limiter: Limiter::new(),
        }
    }

    /// Run one sample through the serial band cascade.
    ///
    /// Each band filters the signal as already modified by the bands below
    /// it and adds its gained contribution on top. Only `coeffs.len()`
    /// bands are touched.
    #[inline]
    pub fn filter(
        &mut self,
        coeffs: &[FilterCoeffs],
        gains: &[f32; BAND_COUNT],
        input: f32,
    ) -> f32 {
        let mut f = input;

        for ((c, g), wq) in coeffs.iter().zip(gains).zip(self.memory.iter_mut()) {
            // AR part
            let w = f * c.b[0] + wq[0] * c.a[0] + wq[1] * c.a[1];
            // MA part, scaled and accumulated
            f += (w + wq[1] * c.b[1]) * g;

            wq[1] = wq[0];
            wq[0] = w;
        }

        f
    }

    #[inline]
    pub fn limiter_mut(&mut self) -> &mut Limiter {
        &mut self.limiter
    }

    pub fn limiter(&self) -> &Limiter {
        &self.limiter
    }

    /// Delay memory of one band
    pub fn memory(&self, band: usize) -> [f32; 2] {
        self.memory[band]
    }

    /// False once an overflow has reached the delay memory
    pub fn is_finite(&self) -> bool {
        self.memory.iter().flatten().all(|w| w.is_finite())
    }

    /// Clear delay memory and return the limiter to unity
    pub fn reset(&mut self) {
        self.memory = [[0.0; 2]; BAND_COUNT];
        self.limiter.reset();
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new()
    }
}
