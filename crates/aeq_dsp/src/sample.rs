//! Sample Formats
//!
//! The filter cascade always runs in `f32`. A [`Sample`] describes how a
//! stream's native sample type enters and leaves that domain, and whether
//! its range is fixed (in which case the limiter guards the conversion).

/// A sample type the equalizer can read and write
pub trait Sample: Copy + Send + 'static {
    /// Representable `(min, max)` for fixed-range formats, `None` for
    /// formats that can hold any value the cascade produces.
    const RANGE: Option<(f32, f32)>;

    fn to_f32(self) -> f32;

    fn from_f32(value: f32) -> Self;
}

/// Signed 16-bit PCM, full integer scale
impl Sample for i16 {
    const RANGE: Option<(f32, f32)> = Some((i16::MIN as f32, i16::MAX as f32));

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    /// Truncates toward zero and saturates at the type bounds.
    #[inline]
    fn from_f32(value: f32) -> Self {
        value as i16
    }
}

/// 32-bit float, left unclamped for downstream range handling
impl Sample for f32 {
    const RANGE: Option<(f32, f32)> = None;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }
}
