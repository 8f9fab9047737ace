//! Output signature waveshaping.
//!
//! The "signature" stage sits after the engine render and before scaling to
//! output volts. It folds peaks back instead of clipping them, which adds
//! harmonics that thicken the raw engine output. The dry/wet amount is a
//! single knob in [0, 1].

use crate::math::lerp;

/// A memoryless sample transform.
pub trait Waveshaper {
    /// Shape one sample. Implementations must accept any finite input and
    /// return a bounded output.
    fn transform(&self, x: f32) -> f32;
}

/// Triangle foldback around [-1, 1].
///
/// Values inside the window pass through unchanged; values outside reflect
/// back and forth off the +-1 boundaries until they land inside. Computed in
/// closed form from the position within the 4-unit fold period, so large
/// inputs cost the same as small ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldbackShaper;

impl Waveshaper for FoldbackShaper {
    #[inline]
    fn transform(&self, x: f32) -> f32 {
        if (-1.0..=1.0).contains(&x) {
            return x;
        }
        // Shift so the period starts at a fold minimum, wrap into [0, 4),
        // then mirror the second half of the triangle.
        let t = (x + 1.0).rem_euclid(4.0);
        if t < 2.0 { t - 1.0 } else { 3.0 - t }
    }
}

/// Blend a shaped sample with the raw one: `amount` 0 is fully dry, 1 is
/// fully folded. Out-of-range amounts clamp.
#[inline]
pub fn signature_mix<W: Waveshaper>(shaper: &W, raw: f32, amount: f32) -> f32 {
    let amount = amount.clamp(0.0, 1.0);
    lerp(raw, shaper.transform(raw), amount)
}
