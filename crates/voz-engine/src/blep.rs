//! Phase accumulation and PolyBLEP band-limiting shared by the reference
//! engines.

/// Two-sample polynomial band-limited step correction.
///
/// `t` is the current phase in [0, 1), `dt` the per-sample increment. Added
/// to a naive discontinuous waveform at its step, this cancels most of the
/// aliasing for a fraction of the cost of additive synthesis.
#[inline]
pub(crate) fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

/// Wrapping phase accumulator in [0, 1).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Phasor {
    pub phase: f32,
}

impl Phasor {
    /// Advance by `dt` and return the pre-advance phase.
    #[inline]
    pub fn tick(&mut self, dt: f32) -> f32 {
        let p = self.phase;
        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        p
    }

    /// Hard-sync the phase back to zero.
    #[inline]
    pub fn sync(&mut self) {
        self.phase = 0.0;
    }
}

/// Band-limited sawtooth in [-1, 1].
#[inline]
pub(crate) fn saw(t: f32, dt: f32) -> f32 {
    2.0 * t - 1.0 - poly_blep(t, dt)
}

/// Band-limited pulse with the given width.
#[inline]
pub(crate) fn pulse(t: f32, dt: f32, width: f32) -> f32 {
    let width = width.clamp(0.05, 0.95);
    let naive = if t < width { 1.0 } else { -1.0 };
    let mut fall = t - width;
    if fall < 0.0 {
        fall += 1.0;
    }
    naive + poly_blep(t, dt) - poly_blep(fall, dt)
}

/// Naive triangle in [-1, 1]. Harmonics fall at 12 dB/octave, so the naive
/// form aliases little and needs no correction.
#[inline]
pub(crate) fn triangle(t: f32) -> f32 {
    if t < 0.5 { 4.0 * t - 1.0 } else { 3.0 - 4.0 * t }
}
