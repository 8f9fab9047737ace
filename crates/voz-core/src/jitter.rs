//! Seedable analog-style pitch drift.
//!
//! Emulated analog oscillators are expected to wander slightly. The
//! [`DriftSource`] produces a small random pitch-code offset per render
//! block: white noise from a [`XorShift32`] generator, smoothed by a
//! [`OnePole`] so the wander is slow rather than per-block hash. The
//! amount knob is quantized to a handful of depth steps, matching how the
//! settings blob stores it.

use crate::math::lerp;
use crate::one_pole::OnePole;

/// Maximum drift excursion in pitch-code units (128 per semitone), so the
/// full-depth wander stays within +-1/8 semitone.
pub const MAX_DRIFT_CODE: f32 = 16.0;

/// Number of drift depth steps above zero.
pub const DRIFT_STEPS: u8 = 4;

/// xorshift32 pseudo-random generator (Marsaglia).
///
/// Deterministic for a given seed. Seed zero is remapped because the
/// xorshift state must be nonzero.
#[derive(Debug, Clone, Copy)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Create a generator from a seed.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9e37_79b9 } else { seed },
        }
    }

    /// Next raw 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Next value uniform in [-1.0, 1.0].
    #[inline]
    pub fn next_bipolar(&mut self) -> f32 {
        (self.next_u32() as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

impl Default for XorShift32 {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Smoothed random pitch-code offset, evaluated once per render block.
#[derive(Debug, Clone)]
pub struct DriftSource {
    rng: XorShift32,
    smoother: OnePole,
}

impl DriftSource {
    /// Create a drift source. Different seeds give different voices
    /// independent wander.
    pub fn new(seed: u32) -> Self {
        Self {
            rng: XorShift32::new(seed),
            // Evaluated per block (hundreds of Hz), so a heavy coefficient
            // gives a sub-audio wander rate.
            smoother: OnePole::from_coeff(0.995),
        }
    }

    /// Produce the next drift offset in pitch-code units.
    ///
    /// `amount` is the stored depth step, clamped to [`DRIFT_STEPS`];
    /// zero disables drift entirely (and keeps the smoother converging to
    /// zero so re-enabling does not jump).
    #[inline]
    pub fn render(&mut self, amount: u8) -> i32 {
        let depth = f32::from(amount.min(DRIFT_STEPS)) / f32::from(DRIFT_STEPS);
        let target = if depth > 0.0 {
            self.rng.next_bipolar()
        } else {
            0.0
        };
        let smoothed = self.smoother.process(target);
        lerp(0.0, MAX_DRIFT_CODE, depth * smoothed) as i32
    }

    /// Reset smoother state (the generator keeps its sequence position).
    pub fn reset(&mut self) {
        self.smoother.reset();
    }
}
