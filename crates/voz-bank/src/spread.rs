//! Unison detune spread.

use voz_core::lerp;

/// Pitch offset in semitones for voice `index` of `count` unison voices at
/// spread `amount` in [0, 1].
///
/// Voices are centered: voice positions run linearly from -1 to +1. The
/// amount knob covers three regimes:
///
/// - `[0, 0.5)` - chorus range, outer voices reach ±`amount` semitones
///   (±0.5 st at the boundary)
/// - `[0.5, 0.9)` - the outer reach grows linearly from ±0.5 to ±12
///   semitones
/// - `[0.9, 1.0]` - the linear spread collapses, with cubic easing, onto
///   exact octaves: voice `index % 3` lands on -12, 0 or +12 semitones at
///   `amount` = 1
///
/// Pure and deterministic; continuous in `amount` across both boundaries.
pub fn spread_offset(count: usize, index: usize, amount: f32) -> f32 {
    // A lone voice stays centered at any amount; the octave regime below
    // assigns targets by index and must never see it.
    if count <= 1 {
        return 0.0;
    }
    let amount = amount.clamp(0.0, 1.0);
    let position = (index.min(count - 1) as f32 / (count - 1) as f32) * 2.0 - 1.0;
    if amount < 0.5 {
        position * amount
    } else {
        let reach = lerp(0.5, 12.0, (amount - 0.5) / 0.4);
        let linear = position * reach.min(12.0);
        if amount < 0.9 {
            linear
        } else {
            let octaves = [-12.0, 0.0, 12.0][index % 3];
            let t = (amount - 0.9) / 0.1;
            let ease = t * t * (3.0 - 2.0 * t);
            lerp(linear, octaves, ease)
        }
    }
}
