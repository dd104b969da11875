//! Adaptive Clip-Prevention Limiter
//!
//! Protects fixed-range output formats from overflow. Instead of clipping
//! every over-range sample, the limiter lowers a per-channel attenuation so
//! the offending sample lands exactly on the boundary, then lets the
//! attenuation creep back toward unity.
//!
//! # Algorithm
//!
//! For each sample:
//! 1. Scale by the current attenuation
//! 2. If the result is outside `[min, max]`, shrink the attenuation so it
//!    lands on the boundary and output the boundary value
//! 3. Multiply the attenuation by [`RECOVERY_PER_SAMPLE`], capped at 1.0
//!
//! Floating-point outputs never go through here.

/// Per-sample recovery multiplier.
///
/// Tuned against a 44.1 kHz stream to bring back 10 dB over 10 seconds.
pub const RECOVERY_PER_SAMPLE: f32 = 1.000_006_8;

/// Attenuation state for one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limiter {
    attenuation: f32,
}

impl Limiter {
    pub fn new() -> Self {
        Self { attenuation: 1.0 }
    }

    /// Current attenuation (1.0 = unity)
    pub fn attenuation(&self) -> f32 {
        self.attenuation
    }

    /// Return to unity gain
    pub fn reset(&mut self) {
        self.attenuation = 1.0;
    }

    /// Limit one sample to `[min, max]`.
    ///
    /// # Real-time Safety
    /// No allocations, no syscalls, O(1) time.
    #[inline]
    pub fn limit(&mut self, sample: f32, min: f32, max: f32) -> f32 {
        let mut f = sample * self.attenuation;

        if f > max {
            if f.is_finite() {
                self.attenuation *= max / f;
            }
            f = max;
        } else if f < min {
            if f.is_finite() {
                self.attenuation *= min / f;
            }
            f = min;
        }

        self.attenuation = (self.attenuation * RECOVERY_PER_SAMPLE).min(1.0);
        f
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new()
    }
}
